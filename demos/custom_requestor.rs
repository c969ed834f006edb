//! Demonstrates implementing [`Requestor`] for a bespoke transport and mapping its failures onto
//! the broker's transport error variants.
//!
//! 1. Implement [`Requestor`] so the transport resolves each [`ApiRequest`] itself and returns
//!    the raw response body on success; the caches decode JSON on their side.
//! 2. Surface connection-level failures through [`TransportError::network`] so callers receive
//!    the broker's canonical error taxonomy regardless of the HTTP stack underneath.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::Arc,
};
// crates.io
use color_eyre::Result;
// self
use token_broker::{
	auth::Credential,
	cache::AccessTokenCache,
	error::TransportError,
	http::{ApiRequest, RequestFuture, Requestor},
	sink::{SharedTokens, TokenSink},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let mirror = SharedTokens::new();
	let sink: Arc<dyn TokenSink> = Arc::new(mirror.clone());
	let cache: AccessTokenCache<MockTransport> =
		AccessTokenCache::new(MockTransport::default(), sink);
	let credential = Credential::new("demo-ak", "demo-sk");
	let token = cache.get_token(&credential).await?;

	println!("Access token issued by the mock transport: {}.", token.expose());

	if let Some(observed) = mirror.latest_access_token() {
		println!("Mirror observed the confirmed token: {}.", observed.expose());
	}

	let failing = AccessTokenCache::new(
		MockTransport::transport_error(MockTransportError::DnsFailure {
			host: "gateway.example.com",
		}),
		Arc::new(SharedTokens::new()),
	);

	match failing.get_token(&credential).await {
		Ok(_) => println!("Mock transport unexpectedly succeeded."),
		Err(e) => println!("Transport error mapped by the cache: {e}."),
	}

	let timing_out = AccessTokenCache::new(
		MockTransport::transport_error(MockTransportError::BackendTimeout),
		Arc::new(SharedTokens::new()),
	);

	match timing_out.get_token(&credential).await {
		Ok(_) => println!("Mock transport unexpectedly produced a token."),
		Err(e) => println!("Timeout mapped by the cache: {e}."),
	}

	Ok(())
}

#[derive(Clone, Debug)]
enum MockTransportError {
	DnsFailure { host: &'static str },
	BackendTimeout,
}
impl Display for MockTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::DnsFailure { host } => write!(f, "DNS lookup failed for {host}"),
			Self::BackendTimeout => write!(f, "Token endpoint timed out"),
		}
	}
}
impl StdError for MockTransportError {}

#[derive(Clone)]
enum MockBehavior {
	Success,
	TransportError(MockTransportError),
}

struct MockTransport {
	behavior: MockBehavior,
}
impl MockTransport {
	fn success() -> Self {
		Self { behavior: MockBehavior::Success }
	}

	fn transport_error(error: MockTransportError) -> Self {
		Self { behavior: MockBehavior::TransportError(error) }
	}
}
impl Default for MockTransport {
	fn default() -> Self {
		Self::success()
	}
}
impl Requestor for MockTransport {
	fn execute(&self, _request: ApiRequest) -> RequestFuture<'_> {
		let behavior = self.behavior.clone();

		Box::pin(async move {
			match behavior {
				MockBehavior::Success =>
					Ok(b"{\"access_token\":\"mock-access\",\"expires_in\":3600}".to_vec()),
				MockBehavior::TransportError(error) => Err(TransportError::network(error)),
			}
		})
	}
}
