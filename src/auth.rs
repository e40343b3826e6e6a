//! Access token acquisition, caching, and the clock used to judge expiry.

pub mod cache;
pub mod client_credentials;
pub mod clock;
pub mod secret;

pub use cache::*;
pub use client_credentials::*;
pub use clock::*;
pub use secret::*;

// self
use crate::_prelude::*;

/// Boxed future returned by [`AccessTokenProvider::access_token`].
pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenSecret>> + 'a + Send>>;

/// Per-carrier source of bearer tokens.
pub trait AccessTokenProvider
where
	Self: Send + Sync,
{
	/// Returns a usable token, reusing the cached one unless `force_refresh` is set.
	fn access_token(&self, force_refresh: bool) -> AuthFuture<'_>;
}
