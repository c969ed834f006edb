//! Demonstrates refreshing a bearer token ahead of its expiry and pinning a preset token that
//! bypasses the identity service entirely.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::Duration;
use url::Url;
// self
use token_broker::{
	cache::ReqwestBearerTokenCache,
	http::ReqwestRequestor,
	sink::{SharedTokens, TokenSink},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/BCE-BEARER/token").query_param("expireInSeconds", "600");
			then.status(200).header("content-type", "application/json").body(
				"{\"userId\":\"demo-user\",\"token\":\"demo-bearer\",\"status\":\"enable\",\
				 \"createTime\":\"2026-01-01T00:00:00Z\",\"expireTime\":\"2999-01-01T00:00:00Z\"}",
			);
		})
		.await;
	let base = Url::parse(&server.base_url())?;
	let mirror = SharedTokens::new();
	let sink: Arc<dyn TokenSink> = Arc::new(mirror.clone());
	let cache =
		ReqwestBearerTokenCache::new(ReqwestRequestor::new(base.clone(), base.clone()), sink)
			.with_requested_expiry(Duration::seconds(600))
			.with_refresh_advance(Duration::seconds(60));
	let first = cache.get_token_with_refresh().await?;
	let second = cache.get_token_with_refresh().await?;

	println!("Issued bearer token: {}.", first.expose());
	println!("Reused while fresh: {}.", first == second);

	if let Some(expiry) = cache.cached_token().and_then(|token| token.expires_at()) {
		println!("Token expires at {expiry}.");
	}

	token_mock.assert_calls_async(1).await;

	let preset = ReqwestBearerTokenCache::new(
		ReqwestRequestor::new(base.clone(), base),
		Arc::new(SharedTokens::new()),
	)
	.with_preset_token("operator-provided-bearer");
	let pinned = preset.get_token_with_refresh().await?;

	println!("Preset token served without any exchange: {}.", pinned.expose());

	Ok(())
}
