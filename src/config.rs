//! Key/value configuration lookups consumed by the transport and carrier adapters.

// self
use crate::_prelude::*;

/// String lookup with a "missing key" failure mode.
pub trait ConfigSource
where
	Self: Send + Sync,
{
	/// Returns the raw value for `key`, if set.
	fn get(&self, key: &str) -> Option<String>;
}

/// Reads configuration from the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvConfig;
impl ConfigSource for EnvConfig {
	fn get(&self, key: &str) -> Option<String> {
		std::env::var(key).ok()
	}
}

/// In-memory configuration for tests and embedders that load settings themselves.
///
/// Values can be replaced at runtime; lookups always observe the latest write.
#[derive(Clone, Debug, Default)]
pub struct MapConfig(Arc<RwLock<HashMap<String, String>>>);
impl MapConfig {
	/// Builder-style insert.
	pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.set(key, value);

		self
	}

	/// Inserts or replaces a value.
	pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
		self.0.write().insert(key.into(), value.into());
	}

	/// Removes a value.
	pub fn remove(&self, key: &str) {
		self.0.write().remove(key);
	}
}
impl<K, V> FromIterator<(K, V)> for MapConfig
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let map = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

		Self(Arc::new(RwLock::new(map)))
	}
}
impl ConfigSource for MapConfig {
	fn get(&self, key: &str) -> Option<String> {
		self.0.read().get(key).cloned()
	}
}

/// Returns the value for `key`, failing `CONFIG_ERROR` when it is missing or empty.
pub fn required_string(source: &dyn ConfigSource, key: &str) -> Result<String> {
	source.get(key).filter(|value| !value.is_empty()).ok_or_else(|| CarrierError::missing_config(key))
}

/// Like [`required_string`] but also requires an absolute URL.
pub fn required_url(source: &dyn ConfigSource, key: &str) -> Result<Url> {
	let raw = required_string(source, key)?;

	Url::parse(&raw).map_err(|e| {
		CarrierError::new(ErrorCode::ConfigError, "Invalid URL configuration")
			.with_details(json!({ "key": key }))
			.with_source(e)
	})
}

/// Parses a numeric value, falling back when it is missing, unparsable, or below `min`.
pub fn number_or<T>(source: &dyn ConfigSource, key: &str, fallback: T, min: Option<T>) -> T
where
	T: Copy + PartialOrd + FromStr,
{
	let Some(raw) = source.get(key).filter(|value| !value.trim().is_empty()) else {
		return fallback;
	};

	match raw.trim().parse::<T>() {
		Ok(parsed) if min.is_none_or(|min| parsed >= min) => parsed,
		_ => fallback,
	}
}
