//! Carrier access tokens as they travel from the token endpoint to rating calls.
//!
//! The raw string only leaves [`TokenSecret`] through [`TokenSecret::bearer`] when an
//! `Authorization` header is built, or through [`TokenSecret::expose`] in tests and caches.

// self
use crate::_prelude::*;

const REDACTED: &str = "<redacted>";

/// Access token issued by a carrier's OAuth endpoint; formats as `<redacted>`.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Takes ownership of the `access_token` returned by a carrier.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Raw token string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// `Bearer <token>`, ready for a rating call's `Authorization` header.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenSecret({REDACTED})")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(REDACTED)
	}
}
