// self
use crate::obs::{RefreshKind, RefreshOutcome};

/// Records a refresh outcome via the global metrics recorder (when enabled).
pub fn record_refresh_outcome(kind: RefreshKind, outcome: RefreshOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"token_broker_refresh_total",
			"cache" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}
