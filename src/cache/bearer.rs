//! Single-slot bearer-token cache with preset and dynamic modes.
//!
//! A caller-preset token pins the cache: it is served forever and never refreshed. In dynamic
//! mode the cache tracks the expiry stamp reported by the identity service and refreshes once
//! the remaining lifetime shrinks to the configured advance window, so callers never hold a
//! token that is about to lapse mid-request.

// self
use crate::{
	_prelude::*,
	auth::{BearerToken, TokenSecret},
	cache::RefreshMetrics,
	http::{Requestor, decode_json},
	obs::{self, RefreshKind, RefreshOutcome, RefreshSpan},
	protocol::{BearerTokenResponse, bearer_refresh_request},
	sink::TokenSink,
};

/// Single-slot bearer-token cache over an opaque transport.
///
/// All state lives behind `Arc`, so clones are cheap handles onto one logical cache sharing the
/// slot, the singleflight guard, and the metrics.
pub struct BearerTokenCache<R>
where
	R: ?Sized + Requestor,
{
	/// Transport executing every upstream exchange.
	pub requestor: Arc<R>,
	/// Observer notified after each confirmed refresh.
	pub sink: Arc<dyn TokenSink>,
	/// Shared metrics recorder for refresh outcomes.
	pub metrics: Arc<RefreshMetrics>,
	requested_expiry: Duration,
	refresh_advance: Duration,
	slot: Arc<RwLock<Option<BearerToken>>>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<R> BearerTokenCache<R>
where
	R: ?Sized + Requestor,
{
	/// Default lifetime requested from the identity service.
	pub const DEFAULT_REQUESTED_EXPIRY: Duration = Duration::seconds(3_600);
	/// Default advance window within which tokens refresh proactively.
	pub const DEFAULT_REFRESH_ADVANCE: Duration = Duration::seconds(60);

	/// Creates an empty cache over the given transport and sink.
	pub fn new(requestor: impl Into<Arc<R>>, sink: Arc<dyn TokenSink>) -> Self {
		Self {
			requestor: requestor.into(),
			sink,
			metrics: Default::default(),
			requested_expiry: Self::DEFAULT_REQUESTED_EXPIRY,
			refresh_advance: Self::DEFAULT_REFRESH_ADVANCE,
			slot: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Pins the cache to a caller-supplied token that is served forever and never refreshed.
	///
	/// Empty input is ignored, so a blank configuration value falls through to dynamic mode.
	pub fn with_preset_token(self, token: impl Into<String>) -> Self {
		let token = token.into();

		if !token.is_empty() {
			*self.slot.write() = Some(BearerToken::preset(TokenSecret::new(token)));
		}

		self
	}

	/// Overrides the lifetime requested from the identity service (defaults to one hour).
	///
	/// Non-positive values omit the expiry parameter, delegating the choice upstream.
	pub fn with_requested_expiry(mut self, expiry: Duration) -> Self {
		self.requested_expiry = expiry;

		self
	}

	/// Overrides the advance window within which tokens refresh proactively (defaults to one
	/// minute). Negative values clamp to zero.
	pub fn with_refresh_advance(mut self, advance: Duration) -> Self {
		self.refresh_advance = if advance.is_negative() { Duration::ZERO } else { advance };

		self
	}

	/// Returns the cached bearer token, refreshing it first when it is missing or inside the
	/// advance window.
	///
	/// Concurrent callers queue on the cache-wide guard, and the losers are served from the
	/// freshly written slot. Failures (transport, decode, or a malformed expiry stamp) propagate
	/// without touching the slot, so the next call re-attempts.
	pub async fn get_token_with_refresh(&self) -> Result<TokenSecret> {
		const KIND: RefreshKind = RefreshKind::Bearer;
		const SUBJECT: &str = "bearer";

		let span = RefreshSpan::new(KIND, "get_token_with_refresh");

		obs::record_refresh_outcome(KIND, RefreshOutcome::Attempt);
		self.metrics.record_attempt();

		let result: Result<TokenSecret> = span
			.instrument(async move {
				let _singleflight = self.refresh_guard.lock().await;
				let now = OffsetDateTime::now_utc();

				if let Some(token) =
					self.cached_token().filter(|token| !token.needs_refresh_at(now))
				{
					self.metrics.record_hit();

					return Ok(token.token().clone());
				}

				obs::refresh_started(KIND, SUBJECT);

				let request = bearer_refresh_request(self.requested_expiry);
				let body = self.requestor.execute(request).await?;
				let response = decode_json::<BearerTokenResponse>(&body)?;
				let expires_at = response.parsed_expire_time()?;
				let token = response.token;

				*self.slot.write() =
					Some(BearerToken::issued(token.clone(), expires_at, self.refresh_advance));
				self.sink.publish_bearer_token(&token);
				self.metrics.record_refresh();

				obs::refresh_succeeded(KIND, SUBJECT);

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_refresh_outcome(KIND, RefreshOutcome::Success),
			Err(e) => {
				obs::refresh_failed(KIND, SUBJECT, &e.to_string());
				obs::record_refresh_outcome(KIND, RefreshOutcome::Failure);
				self.metrics.record_failure();
			},
		}

		result
	}

	/// Returns a copy of the cached token without triggering any refresh.
	pub fn cached_token(&self) -> Option<BearerToken> {
		self.slot.read().clone()
	}

	/// Returns `true` when the cache is pinned to a caller-supplied token.
	pub fn is_preset(&self) -> bool {
		self.cached_token().is_some_and(|token| token.is_preset())
	}
}
impl<R> Clone for BearerTokenCache<R>
where
	R: ?Sized + Requestor,
{
	fn clone(&self) -> Self {
		Self {
			requestor: self.requestor.clone(),
			sink: self.sink.clone(),
			metrics: self.metrics.clone(),
			requested_expiry: self.requested_expiry,
			refresh_advance: self.refresh_advance,
			slot: self.slot.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<R> Debug for BearerTokenCache<R>
where
	R: ?Sized + Requestor,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		// Snapshot the slot once; re-reading it mid-format can park behind a queued writer.
		let cached = self.cached_token();

		f.debug_struct("BearerTokenCache")
			.field("cached", &cached.is_some())
			.field("preset", &cached.is_some_and(|token| token.is_preset()))
			.field("requested_expiry", &self.requested_expiry)
			.field("refresh_advance", &self.refresh_advance)
			.finish()
	}
}
