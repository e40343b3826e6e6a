// self
use crate::{
	_prelude::*,
	obs::{OperationKind, RetryReason, count_retry},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by carrier operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the operation kind and carrier label.
	pub fn new(kind: OperationKind, carrier: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("carrier_rates.operation", operation = kind.as_str(), carrier);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, carrier);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs and counts a transport retry scheduled after `delay`.
pub fn record_retry(url: &str, attempt: u32, delay: StdDuration, reason: RetryReason) {
	#[cfg(feature = "tracing")]
	{
		let status = match reason {
			RetryReason::Status(status) => Some(status),
			RetryReason::Timeout => None,
		};

		tracing::warn!(
			url,
			attempt,
			delay_ms = delay.as_millis() as u64,
			reason = reason.as_str(),
			status,
			"retrying carrier HTTP request"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (url, attempt, delay);
	}

	count_retry(reason);
}

/// Logs an operation failure with its classified code.
pub fn record_failure(kind: OperationKind, carrier: &str, error: &CarrierError) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			operation = kind.as_str(),
			carrier,
			code = error.code.as_str(),
			status = error.status,
			"carrier operation failed: {}",
			error.message
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, carrier, error);
	}
}
