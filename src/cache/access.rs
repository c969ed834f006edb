//! Per-credential access-token cache with throttled, stampede-free refresh.
//!
//! The cache exposes [`AccessTokenCache::get_token`] for the hot path (serve whatever is cached,
//! refresh only on a miss) and [`AccessTokenCache::get_token_with_refresh`] for callers that
//! just learned their token was rejected. Forced refreshes are throttled per credential so a
//! burst of rejection-driven calls collapses to one upstream exchange per interval, and a
//! per-credential singleflight guard keeps concurrent callers from stampeding the gateway.

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenEntry, Credential, TokenSecret},
	cache::{RefreshMetrics, common},
	http::{Requestor, decode_json},
	obs::{self, RefreshKind, RefreshOutcome, RefreshSpan},
	protocol::{AccessTokenGrant, AccessTokenResponse},
	sink::TokenSink,
};

/// Keyed access-token cache over an opaque transport.
///
/// All state lives behind `Arc`, so clones are cheap handles onto one logical cache: entries,
/// singleflight guards, and metrics are shared. Entries are never evicted; the maps are bounded
/// by the distinct credentials the process uses.
pub struct AccessTokenCache<R>
where
	R: ?Sized + Requestor,
{
	/// Transport executing every upstream exchange.
	pub requestor: Arc<R>,
	/// Observer notified after each confirmed refresh.
	pub sink: Arc<dyn TokenSink>,
	/// Shared metrics recorder for refresh outcomes.
	pub metrics: Arc<RefreshMetrics>,
	min_refresh_interval: Duration,
	entries: Arc<RwLock<HashMap<Credential, AccessTokenEntry>>>,
	refresh_guards: Arc<Mutex<HashMap<Credential, Arc<AsyncMutex<()>>>>>,
}
impl<R> AccessTokenCache<R>
where
	R: ?Sized + Requestor,
{
	/// Default minimum interval between forced refreshes of one credential.
	pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::seconds(3_600);

	/// Creates an empty cache over the given transport and sink.
	pub fn new(requestor: impl Into<Arc<R>>, sink: Arc<dyn TokenSink>) -> Self {
		Self {
			requestor: requestor.into(),
			sink,
			metrics: Default::default(),
			min_refresh_interval: Self::DEFAULT_MIN_REFRESH_INTERVAL,
			entries: Default::default(),
			refresh_guards: Default::default(),
		}
	}

	/// Overrides the refresh throttle window (defaults to one hour).
	///
	/// Negative values clamp to zero, which disables the throttle entirely.
	pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
		self.min_refresh_interval = if interval.is_negative() { Duration::ZERO } else { interval };

		self
	}

	/// Returns the cached token for `credential`, refreshing only on a cache miss.
	///
	/// A hit is served regardless of age (staleness is the refresh path's concern) and never
	/// waits on refreshes of other credentials.
	pub async fn get_token(&self, credential: &Credential) -> Result<TokenSecret> {
		const KIND: RefreshKind = RefreshKind::AccessToken;

		if let Some(entry) = self.cached_entry(credential) {
			return Ok(entry.token);
		}

		obs::refresh_started(KIND, &credential.masked_access_key());

		self.get_token_with_refresh(credential).await
	}

	/// Refreshes the token for `credential` unless it was refreshed within the throttle window.
	///
	/// At most one exchange per credential is in flight at any time: concurrent callers queue on
	/// a per-credential guard, and the losers are served from the freshly written entry by the
	/// throttle re-check. Failures propagate without touching the cached entry, so the next call
	/// re-attempts.
	pub async fn get_token_with_refresh(&self, credential: &Credential) -> Result<TokenSecret> {
		const KIND: RefreshKind = RefreshKind::AccessToken;

		let span = RefreshSpan::new(KIND, "get_token_with_refresh");

		obs::record_refresh_outcome(KIND, RefreshOutcome::Attempt);
		self.metrics.record_attempt();

		let result = span
			.instrument(async move {
				let subject = credential.masked_access_key();
				let guard = common::refresh_guard(&self.refresh_guards, credential);
				let _singleflight = guard.lock().await;
				let now = OffsetDateTime::now_utc();

				if let Some(entry) = self
					.cached_entry(credential)
					.filter(|entry| entry.within_throttle(now, self.min_refresh_interval))
				{
					obs::throttle_hit(KIND, &subject, entry.age_at(now));
					self.metrics.record_hit();

					return Ok(entry.token);
				}

				let request = AccessTokenGrant::for_credential(credential).into_request();
				let body = self.requestor.execute(request).await?;
				let response = decode_json::<AccessTokenResponse>(&body)?;

				if response.is_error() {
					return Err(Error::Api {
						code: response.error,
						description: response.error_description,
					});
				}

				let token = response.access_token;
				let refreshed_at = OffsetDateTime::now_utc();

				self.entries
					.write()
					.insert(credential.clone(), AccessTokenEntry::new(token.clone(), refreshed_at));
				self.sink.publish_access_token(credential, &token);
				self.metrics.record_refresh();

				obs::refresh_succeeded(KIND, &subject);

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_refresh_outcome(KIND, RefreshOutcome::Success),
			Err(e) => {
				obs::refresh_failed(KIND, &credential.masked_access_key(), &e.to_string());
				obs::record_refresh_outcome(KIND, RefreshOutcome::Failure);
				self.metrics.record_failure();
			},
		}

		result
	}

	/// Returns a copy of the cached entry for `credential` without triggering any refresh.
	pub fn cached_entry(&self, credential: &Credential) -> Option<AccessTokenEntry> {
		self.entries.read().get(credential).cloned()
	}
}
impl<R> Clone for AccessTokenCache<R>
where
	R: ?Sized + Requestor,
{
	fn clone(&self) -> Self {
		Self {
			requestor: self.requestor.clone(),
			sink: self.sink.clone(),
			metrics: self.metrics.clone(),
			min_refresh_interval: self.min_refresh_interval,
			entries: self.entries.clone(),
			refresh_guards: self.refresh_guards.clone(),
		}
	}
}
impl<R> Debug for AccessTokenCache<R>
where
	R: ?Sized + Requestor,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessTokenCache")
			.field("entries", &self.entries.read().len())
			.field("min_refresh_interval", &self.min_refresh_interval)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{
		cache::stub::ScriptedRequestor,
		error::TransportError,
		http::{ApiTarget, RequestMethod},
		protocol::ACCESS_TOKEN_PATH,
		sink::{NullSink, SharedTokens},
	};

	fn token_payload(token: &str) -> Result<Vec<u8>, TransportError> {
		ScriptedRequestor::json(json!({ "access_token": token, "expires_in": 3_600 }))
	}

	fn rejection_payload() -> Result<Vec<u8>, TransportError> {
		ScriptedRequestor::json(json!({
			"error": "invalid_client",
			"error_description": "unknown client id",
		}))
	}

	#[tokio::test]
	async fn miss_exchanges_once_then_serves_from_cache() {
		let cache = AccessTokenCache::new(
			ScriptedRequestor::new([token_payload("tok-123")]),
			Arc::new(NullSink),
		);
		let credential = Credential::new("k1", "s1");
		let first = cache.get_token(&credential).await.expect("First lookup should refresh.");
		let second =
			cache.get_token(&credential).await.expect("Second lookup should hit the cache.");

		assert_eq!(first.expose(), "tok-123");
		assert_eq!(second.expose(), "tok-123");
		assert_eq!(cache.requestor.calls(), 1);
	}

	#[tokio::test]
	async fn grant_request_targets_the_gateway_token_path() {
		let cache = AccessTokenCache::new(
			ScriptedRequestor::new([token_payload("tok")]),
			Arc::new(NullSink),
		);
		let credential = Credential::new("ak-form", "sk-form");

		cache.get_token(&credential).await.expect("Lookup should refresh.");

		let request = cache.requestor.last_request().expect("One request should be recorded.");

		assert_eq!(request.method, RequestMethod::Post);
		assert_eq!(request.target, ApiTarget::Gateway);
		assert_eq!(request.path, ACCESS_TOKEN_PATH);
		assert_eq!(
			request.form.get("grant_type").map(String::as_str),
			Some("client_credentials")
		);
		assert_eq!(request.form.get("client_id").map(String::as_str), Some("ak-form"));
		assert_eq!(request.form.get("client_secret").map(String::as_str), Some("sk-form"));
	}

	#[tokio::test]
	async fn forced_refresh_within_the_throttle_serves_the_cached_token() {
		let cache = AccessTokenCache::new(
			ScriptedRequestor::new([token_payload("tok-1"), token_payload("tok-2")]),
			Arc::new(NullSink),
		);
		let credential = Credential::new("ak", "sk");

		cache
			.get_token_with_refresh(&credential)
			.await
			.expect("Initial refresh should succeed.");

		let again = cache
			.get_token_with_refresh(&credential)
			.await
			.expect("Throttled refresh should serve the cached token.");

		assert_eq!(again.expose(), "tok-1");
		assert_eq!(cache.requestor.calls(), 1);
		assert_eq!(cache.metrics.cache_hits(), 1);
		assert_eq!(cache.metrics.refreshes(), 1);
	}

	#[tokio::test]
	async fn zero_interval_disables_the_throttle() {
		let cache = AccessTokenCache::new(
			ScriptedRequestor::new([token_payload("tok-1"), token_payload("tok-2")]),
			Arc::new(NullSink),
		)
		.with_min_refresh_interval(Duration::ZERO);
		let credential = Credential::new("ak", "sk");
		let first = cache
			.get_token_with_refresh(&credential)
			.await
			.expect("First refresh should succeed.");
		let second = cache
			.get_token_with_refresh(&credential)
			.await
			.expect("Second refresh should exchange again.");

		assert_eq!(first.expose(), "tok-1");
		assert_eq!(second.expose(), "tok-2");
		assert_eq!(cache.requestor.calls(), 2);
		assert_eq!(
			cache.cached_entry(&credential).map(|entry| entry.token),
			Some(TokenSecret::new("tok-2"))
		);
	}

	#[tokio::test]
	async fn elapsed_throttle_window_reopens_the_exchange() {
		let cache = AccessTokenCache::new(
			ScriptedRequestor::new([token_payload("tok-1"), token_payload("tok-2")]),
			Arc::new(NullSink),
		)
		.with_min_refresh_interval(Duration::milliseconds(50));
		let credential = Credential::new("ak", "sk");

		cache.get_token_with_refresh(&credential).await.expect("Initial refresh should succeed.");

		let stamped = cache.cached_entry(&credential).expect("First entry should be cached.");

		tokio::time::sleep(std::time::Duration::from_millis(60)).await;

		let renewed = cache
			.get_token_with_refresh(&credential)
			.await
			.expect("Refresh past the window should exchange again.");
		let restamped = cache.cached_entry(&credential).expect("Entry should be rewritten.");

		assert_eq!(renewed.expose(), "tok-2");
		assert_eq!(cache.requestor.calls(), 2);
		assert!(restamped.refreshed_at > stamped.refreshed_at);
	}

	#[tokio::test]
	async fn rejection_leaves_the_cache_untouched() {
		let mirror = SharedTokens::new();
		let cache = AccessTokenCache::new(
			ScriptedRequestor::new([rejection_payload(), token_payload("tok-later")]),
			Arc::new(mirror.clone()),
		)
		.with_min_refresh_interval(Duration::ZERO);
		let credential = Credential::new("ak", "sk");
		let error = cache
			.get_token_with_refresh(&credential)
			.await
			.expect_err("Rejected exchange should error.");

		let Error::Api { code, description } = error else {
			panic!("Expected an API-level error.");
		};

		assert_eq!(code, "invalid_client");
		assert_eq!(description, "unknown client id");
		assert!(cache.cached_entry(&credential).is_none());
		assert!(mirror.latest_access_token().is_none());

		let recovered = cache
			.get_token_with_refresh(&credential)
			.await
			.expect("Next attempt should succeed.");

		assert_eq!(recovered.expose(), "tok-later");
		assert_eq!(cache.metrics.attempts(), 2);
		assert_eq!(cache.metrics.failures(), 1);
		assert_eq!(cache.metrics.refreshes(), 1);
	}

	#[tokio::test]
	async fn concurrent_refreshes_collapse_to_one_exchange() {
		let cache = AccessTokenCache::new(
			ScriptedRequestor::new([token_payload("tok-shared")]),
			Arc::new(NullSink),
		);
		let credential = Credential::new("ak", "sk");
		let (first, second) = tokio::join!(
			cache.get_token_with_refresh(&credential),
			cache.get_token_with_refresh(&credential),
		);

		assert_eq!(first.expect("First caller should succeed.").expose(), "tok-shared");
		assert_eq!(second.expect("Second caller should succeed.").expose(), "tok-shared");
		assert_eq!(cache.requestor.calls(), 1);
		assert_eq!(cache.metrics.attempts(), 2);
		assert_eq!(cache.metrics.cache_hits(), 1);
		assert_eq!(cache.metrics.refreshes(), 1);
	}

	#[tokio::test]
	async fn distinct_credentials_keep_independent_entries() {
		let cache = AccessTokenCache::new(
			ScriptedRequestor::new([token_payload("tok-a"), token_payload("tok-b")]),
			Arc::new(NullSink),
		);
		let first = Credential::new("ak-a", "sk-a");
		let second = Credential::new("ak-b", "sk-b");
		let token_a = cache.get_token(&first).await.expect("First credential should refresh.");
		let token_b = cache.get_token(&second).await.expect("Second credential should refresh.");

		assert_eq!(token_a.expose(), "tok-a");
		assert_eq!(token_b.expose(), "tok-b");
		assert_eq!(cache.requestor.calls(), 2);
		assert_eq!(
			cache.cached_entry(&first).map(|entry| entry.token),
			Some(TokenSecret::new("tok-a"))
		);
	}

	#[tokio::test]
	async fn sink_observes_every_confirmed_token() {
		let mirror = SharedTokens::new();
		let cache = AccessTokenCache::new(
			ScriptedRequestor::new([token_payload("tok-published")]),
			Arc::new(mirror.clone()),
		);
		let credential = Credential::new("ak", "sk");

		cache.get_token(&credential).await.expect("Lookup should refresh.");

		assert_eq!(
			mirror.latest_access_token().as_ref().map(TokenSecret::expose),
			Some("tok-published")
		);
	}

	#[tokio::test]
	async fn clones_share_entries_and_metrics() {
		let cache = AccessTokenCache::new(
			ScriptedRequestor::new([token_payload("tok-shared")]),
			Arc::new(NullSink),
		);
		let observer = cache.clone();
		let credential = Credential::new("ak", "sk");

		cache.get_token(&credential).await.expect("Lookup should refresh.");

		assert_eq!(
			observer.cached_entry(&credential).map(|entry| entry.token),
			Some(TokenSecret::new("tok-shared"))
		);
		assert_eq!(observer.metrics.refreshes(), 1);
	}
}
