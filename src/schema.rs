//! Structural validation helpers used at every trust boundary.
//!
//! Untrusted JSON is deserialized through `serde_path_to_error` so a failure reports the exact
//! path that broke; semantic checks collect further [`Issue`]s through [`Issues`].

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::_prelude::*;

/// Single validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
	/// Dotted path of the offending field (`.` for the root).
	pub path: String,
	/// What was wrong with it.
	pub message: String,
}
impl Issue {
	/// Creates a new issue.
	pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
		Self { path: path.into(), message: message.into() }
	}
}

/// Accumulator for semantic validation issues.
#[derive(Clone, Debug, Default)]
pub struct Issues(Vec<Issue>);
impl Issues {
	/// Records an issue.
	pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
		self.0.push(Issue::new(path, message));
	}

	/// Records an issue when `failed` holds.
	pub fn check(&mut self, failed: bool, path: impl Into<String>, message: impl Into<String>) {
		if failed {
			self.push(path, message);
		}
	}

	/// Returns `Ok` when nothing was recorded, otherwise the collected issues.
	pub fn finish(self) -> Result<(), Vec<Issue>> {
		if self.0.is_empty() { Ok(()) } else { Err(self.0) }
	}
}

/// Deserializes `value` into `T`, reporting the failing path on error.
pub fn parse<T>(value: &Value) -> Result<T, Vec<Issue>>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(value).map_err(|e| {
		let path = e.path().to_string();
		let message = e.inner().to_string();

		vec![Issue::new(path, message)]
	})
}
