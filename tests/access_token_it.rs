// crates.io
use httpmock::prelude::*;
// self
use token_broker::{
	_preludet::*,
	auth::{Credential, TokenSecret},
};

const ACCESS_KEY: &str = "ak-integration";
const SECRET_KEY: &str = "sk-integration";

#[tokio::test]
async fn access_token_caches_after_success() {
	let server = MockServer::start_async().await;
	let (cache, mirror) = build_test_access_cache(&server.base_url());
	let credential = Credential::new(ACCESS_KEY, SECRET_KEY);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/2.0/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"cached-token\",\"expires_in\":2592000,\"session_key\":\"sess\"}",
			);
		})
		.await;
	let first = cache
		.get_token(&credential)
		.await
		.expect("Initial lookup should exchange the credential.");
	let second = cache
		.get_token(&credential)
		.await
		.expect("Cached lookup should succeed without another exchange.");

	assert_eq!(first.expose(), "cached-token");
	assert_eq!(second.expose(), "cached-token");

	mock.assert_calls_async(1).await;

	assert_eq!(
		mirror.latest_access_token().as_ref().map(TokenSecret::expose),
		Some("cached-token")
	);
}

#[tokio::test]
async fn access_token_singleflight_requests_once() {
	let server = MockServer::start_async().await;
	let (cache, _mirror) = build_test_access_cache(&server.base_url());
	let credential = Credential::new(ACCESS_KEY, SECRET_KEY);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/2.0/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"guard-token\",\"expires_in\":3600}");
		})
		.await;
	let (first, second): (Result<TokenSecret>, Result<TokenSecret>) = tokio::join!(
		cache.get_token_with_refresh(&credential),
		cache.get_token_with_refresh(&credential),
	);

	assert_eq!(first.expect("First concurrent caller should succeed.").expose(), "guard-token");
	assert_eq!(second.expect("Second concurrent caller should succeed.").expose(), "guard-token");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn access_token_throttles_forced_refreshes() {
	let server = MockServer::start_async().await;
	let (cache, _mirror) = build_test_access_cache(&server.base_url());
	let credential = Credential::new(ACCESS_KEY, SECRET_KEY);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/2.0/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"throttled-token\",\"expires_in\":3600}");
		})
		.await;

	cache
		.get_token_with_refresh(&credential)
		.await
		.expect("Initial forced refresh should exchange the credential.");

	let again = cache
		.get_token_with_refresh(&credential)
		.await
		.expect("Forced refresh inside the throttle window should serve the cached token.");

	assert_eq!(again.expose(), "throttled-token");
	assert_eq!(cache.metrics.cache_hits(), 1);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn access_token_exchanges_each_credential_separately() {
	let server = MockServer::start_async().await;
	let (cache, _mirror) = build_test_access_cache(&server.base_url());
	let first = Credential::new("ak-first", "sk-first");
	let second = Credential::new("ak-second", "sk-second");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/2.0/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"per-credential\",\"expires_in\":3600}");
		})
		.await;

	cache.get_token(&first).await.expect("First credential should exchange.");
	cache.get_token(&second).await.expect("Second credential should exchange.");

	assert!(cache.cached_entry(&first).is_some());
	assert!(cache.cached_entry(&second).is_some());

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn access_token_maps_api_errors_without_caching() {
	let server = MockServer::start_async().await;
	let (cache, mirror) = build_test_access_cache(&server.base_url());
	let credential = Credential::new(ACCESS_KEY, SECRET_KEY);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/2.0/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\",\"error_description\":\"unknown client id\"}");
		})
		.await;
	let err = cache
		.get_token(&credential)
		.await
		.expect_err("Application-level rejections should surface to the caller.");

	let Error::Api { code, description } = err else {
		panic!("Expected an API-level error.");
	};

	assert_eq!(code, "invalid_client");
	assert_eq!(description, "unknown client id");
	assert!(cache.cached_entry(&credential).is_none());
	assert!(mirror.latest_access_token().is_none());

	mock.assert_async().await;
}
