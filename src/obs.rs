//! Optional observability helpers for carrier operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to wrap token fetches, rate quotes, and aggregations in spans named
//!   `carrier_rates.operation` (fields `operation` and `carrier`) and to emit a `warn` event for
//!   every transport retry.
//! - Enable `metrics` to increment `carrier_rates_operation_total` (labels `operation` +
//!   `outcome`) and `carrier_rates_http_retry_total` (label `reason`).

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Access token acquisition (cached or fetched).
	TokenFetch,
	/// A single carrier's rate call.
	RateQuote,
	/// Fan-out across resolved carriers.
	Aggregate,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::TokenFetch => "token_fetch",
			OperationKind::RateQuote => "rate_quote",
			OperationKind::Aggregate => "aggregate",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Why the transport decided to retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RetryReason {
	/// The response carried a 502/503/504 status.
	Status(u16),
	/// The exchange timed out.
	Timeout,
}
impl RetryReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RetryReason::Status(_) => "status",
			RetryReason::Timeout => "timeout",
		}
	}
}

/// Runs `fut` inside an operation span and records attempt/success/failure outcomes.
pub async fn observe<T, Fut>(kind: OperationKind, carrier: &str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(kind, carrier);

	record_outcome(kind, Outcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_outcome(kind, Outcome::Success),
		Err(e) => {
			record_failure(kind, carrier, e);
			record_outcome(kind, Outcome::Failure);
		},
	}

	result
}
