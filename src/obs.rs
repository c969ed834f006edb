//! Optional observability helpers for cache refreshes.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `token_broker.refresh` with the `cache`
//!   (token kind) and `stage` (call site) fields, plus refresh lifecycle events with masked
//!   access keys.
//! - Enable `metrics` to increment the `token_broker_refresh_total` counter for every
//!   attempt/success/failure, labeled by `cache` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Token caches observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshKind {
	/// Per-credential access tokens.
	AccessToken,
	/// The single-slot bearer token.
	Bearer,
}
impl RefreshKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshKind::AccessToken => "access_token",
			RefreshKind::Bearer => "bearer_token",
		}
	}
}
impl Display for RefreshKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each refresh attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// Entry into a refresh operation.
	Attempt,
	/// Successful completion, whether served from cache or exchanged upstream.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Attempt => "attempt",
			RefreshOutcome::Success => "success",
			RefreshOutcome::Failure => "failure",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
