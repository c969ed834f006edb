//! Demonstrates exchanging an AK/SK credential pair for a cached access token with the default
//! reqwest transport and a shared token mirror.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use token_broker::{
	auth::Credential,
	cache::ReqwestAccessTokenCache,
	http::ReqwestRequestor,
	reqwest::Client,
	sink::{SharedTokens, TokenSink},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/2.0/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"expires_in\":2592000,\"session_key\":\"sess\"}",
			);
		})
		.await;
	let base = Url::parse(&server.base_url())?;
	let requestor = ReqwestRequestor::new(base.clone(), base).with_client(Client::builder().build()?);
	let mirror = SharedTokens::new();
	let sink: Arc<dyn TokenSink> = Arc::new(mirror.clone());
	let cache = ReqwestAccessTokenCache::new(requestor, sink);
	let credential = Credential::new("demo-ak", "demo-sk");
	let first = cache.get_token(&credential).await?;
	let second = cache.get_token(&credential).await?;

	println!("Reusable access token: {}.", first.expose());
	println!("Cached lookup reused it: {}.", first == second);

	if let Some(token) = mirror.latest_access_token() {
		println!("Mirror observed the confirmed token: {}.", token.expose());
	}

	token_mock.assert_calls_async(1).await;

	Ok(())
}
