//! Bounded exponential-backoff retries layered over an [`HttpExchange`].

// self
use crate::{
	_prelude::*,
	config::{self, ConfigSource},
	http::{HttpClient, HttpExchange, HttpFuture, HttpRequest, HttpResponse},
	obs::{self, RetryReason},
};

/// Statuses that signal a transient gateway problem.
pub const RETRYABLE_STATUSES: [u16; 3] = [502, 503, 504];

/// Retry budget and backoff base for a transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Retries after the first attempt; `0` still executes once.
	pub max_retries: u32,
	/// Delay before the first retry; doubles for each later retry.
	pub base_delay: StdDuration,
}
impl RetryPolicy {
	/// Key overriding [`RetryPolicy::max_retries`].
	pub const MAX_RETRIES_KEY: &str = "HTTP_MAX_RETRIES";
	/// Key overriding [`RetryPolicy::base_delay`] in milliseconds.
	pub const BASE_DELAY_MS_KEY: &str = "HTTP_RETRY_BASE_DELAY_MS";

	const DEFAULT_BASE_DELAY_MS: u64 = 200;
	const DEFAULT_MAX_RETRIES: u32 = 2;

	/// Creates a policy.
	pub const fn new(max_retries: u32, base_delay: StdDuration) -> Self {
		Self { max_retries, base_delay }
	}

	/// Single attempt, no backoff.
	pub const fn none() -> Self {
		Self::new(0, StdDuration::ZERO)
	}

	/// Reads both knobs, falling back to the defaults (2 retries, 200 ms) on unusable values.
	pub fn from_config(source: &dyn ConfigSource) -> Self {
		let max_retries =
			config::number_or(source, Self::MAX_RETRIES_KEY, Self::DEFAULT_MAX_RETRIES, Some(0));
		let base_delay_ms = config::number_or(
			source,
			Self::BASE_DELAY_MS_KEY,
			Self::DEFAULT_BASE_DELAY_MS,
			Some(0),
		);

		Self::new(max_retries, StdDuration::from_millis(base_delay_ms))
	}

	/// Delay applied before retry number `attempt + 1`: `base_delay × 2^attempt`, no jitter.
	pub fn delay_for(&self, attempt: u32) -> StdDuration {
		let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);

		self.base_delay.saturating_mul(factor)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(Self::DEFAULT_MAX_RETRIES, StdDuration::from_millis(Self::DEFAULT_BASE_DELAY_MS))
	}
}

/// [`HttpClient`] that retries gateway statuses and timeouts of an underlying exchange.
///
/// Only the status code and the failure class are consulted; response bodies are never inspected.
/// When the budget runs out on a retryable status the last response is returned as-is, leaving
/// its classification to the caller.
#[derive(Clone, Debug)]
pub struct RetryingHttpClient<E>
where
	E: HttpExchange,
{
	exchange: Arc<E>,
	policy: RetryPolicy,
}
impl<E> RetryingHttpClient<E>
where
	E: HttpExchange,
{
	/// Wraps `exchange` with `policy`.
	pub fn new(exchange: impl Into<Arc<E>>, policy: RetryPolicy) -> Self {
		Self { exchange: exchange.into(), policy }
	}

	/// Returns the active policy.
	pub fn policy(&self) -> RetryPolicy {
		self.policy
	}

	async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
		let mut attempt = 0;

		loop {
			let retry_reason = match self.exchange.exchange(request.clone()).await {
				Ok(response) if RETRYABLE_STATUSES.contains(&response.status) =>
					if attempt < self.policy.max_retries {
						RetryReason::Status(response.status)
					} else {
						return Ok(response);
					},
				Ok(response) => return Ok(response),
				Err(e) if e.is_timeout() && attempt < self.policy.max_retries => RetryReason::Timeout,
				Err(e) => return Err(e.into()),
			};
			let delay = self.policy.delay_for(attempt);

			obs::record_retry(&request.url, attempt + 1, delay, retry_reason);
			tokio::time::sleep(delay).await;

			attempt += 1;
		}
	}
}
impl<E> HttpClient for RetryingHttpClient<E>
where
	E: HttpExchange,
{
	fn request(&self, request: HttpRequest) -> HttpFuture<'_> {
		Box::pin(self.send(request))
	}
}
