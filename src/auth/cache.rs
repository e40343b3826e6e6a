//! Process-lifetime token storage.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Cached access token and the instant after which it must not be reused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenEntry {
	/// Bearer token.
	pub access_token: TokenSecret,
	/// Absolute expiry, already reduced by the safety buffer.
	pub expires_at: OffsetDateTime,
}
impl TokenEntry {
	/// Creates an entry.
	pub fn new(access_token: TokenSecret, expires_at: OffsetDateTime) -> Self {
		Self { access_token, expires_at }
	}

	/// Whether the entry may still be used at `now`.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		now < self.expires_at
	}
}

/// Narrow get/set contract over token storage.
///
/// Implementations never enforce expiry; callers compare [`TokenEntry::expires_at`] themselves.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the entry stored under `key`.
	fn get(&self, key: &str) -> Option<TokenEntry>;

	/// Replaces the entry stored under `key`.
	fn set(&self, key: &str, entry: TokenEntry);
}

/// Thread-safe in-memory [`TokenStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenCache(Arc<RwLock<HashMap<String, TokenEntry>>>);
impl MemoryTokenCache {
	/// Number of keys currently cached.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Whether nothing has been cached yet.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl TokenStore for MemoryTokenCache {
	fn get(&self, key: &str) -> Option<TokenEntry> {
		self.0.read().get(key).cloned()
	}

	fn set(&self, key: &str, entry: TokenEntry) {
		self.0.write().insert(key.to_owned(), entry);
	}
}
