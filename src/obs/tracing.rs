// self
use crate::{_prelude::*, obs::RefreshKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRefresh<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRefresh<F> = F;

/// A span builder used by cache refresh operations.
#[derive(Clone, Debug)]
pub struct RefreshSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RefreshSpan {
	/// Creates a new span tagged with the provided cache kind + stage.
	pub fn new(kind: RefreshKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("token_broker.refresh", cache = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> RefreshSpanGuard {
		#[cfg(feature = "tracing")]
		{
			RefreshSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			RefreshSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRefresh<Fut>
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

/// RAII guard returned by [`RefreshSpan::entered`].
pub struct RefreshSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for RefreshSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RefreshSpanGuard(..)")
	}
}

/// Emits the cache-miss event preceding a delegated refresh.
pub(crate) fn refresh_started(kind: RefreshKind, subject: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(cache = kind.as_str(), subject, "token not cached; refreshing");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, subject);
	}
}

/// Emits the throttle event for a refresh served from a recently updated entry.
pub(crate) fn throttle_hit(kind: RefreshKind, subject: &str, age: Duration) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			cache = kind.as_str(),
			subject,
			age_secs = age.whole_seconds(),
			"token freshly updated; skipping refresh"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, subject, age);
	}
}

/// Emits the success event after a confirmed upstream exchange.
pub(crate) fn refresh_succeeded(kind: RefreshKind, subject: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(cache = kind.as_str(), subject, "token refreshed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, subject);
	}
}

/// Emits the failure event for a refresh that errored out.
pub(crate) fn refresh_failed(kind: RefreshKind, subject: &str, reason: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(cache = kind.as_str(), subject, reason, "token refresh failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, subject, reason);
	}
}
