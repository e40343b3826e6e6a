// self
use crate::obs::{OperationKind, Outcome, RetryReason};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_outcome(kind: OperationKind, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"carrier_rates_operation_total",
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts a transport retry (when enabled).
pub fn count_retry(reason: RetryReason) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("carrier_rates_http_retry_total", "reason" => reason.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_outcome(OperationKind::RateQuote, Outcome::Failure);
		count_retry(RetryReason::Status(503));
	}
}
