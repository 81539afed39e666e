// self
use crate::obs::{CallKind, CallOutcome};

/// Increments `auth_relay_call_total{call, outcome}` (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"auth_relay_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records how many queued requests a settled refresh released, labeled by its outcome.
///
/// Feeds the `auth_relay_refresh_released` histogram; a steadily high value means many
/// requests are outliving their access token at once.
pub fn record_refresh_settled(outcome: CallOutcome, released: usize) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!("auth_relay_refresh_released", "outcome" => outcome.as_str())
			.record(released as f64);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (outcome, released);
	}
}
