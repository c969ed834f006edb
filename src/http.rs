//! Transport primitives for gateway token exchanges.
//!
//! The module exposes [`Requestor`], the broker's only dependency on an HTTP stack, together
//! with the transport-agnostic [`ApiRequest`] description and the JSON decoding helper shared by
//! both caches. Deployments with bespoke transports (request signing, proxies, recorded fixtures)
//! implement [`Requestor`] themselves; [`ReqwestRequestor`] covers the common case behind the
//! `reqwest` feature.

// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`Requestor::execute`].
pub type RequestFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Vec<u8>, TransportError>> + 'a + Send>>;

/// HTTP verb used by a token exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestMethod {
	/// HTTP GET.
	Get,
	/// HTTP POST carrying a URL-encoded form body.
	Post,
}

/// Upstream service addressed by a request.
///
/// The gateway issues access tokens; the identity service issues bearer tokens. Transports map
/// each target onto its configured base URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiTarget {
	/// The API gateway (access-token grants).
	Gateway,
	/// The identity service (bearer tokens).
	Identity,
}

/// Transport-agnostic description of one token-endpoint request.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: RequestMethod,
	/// Upstream service to address.
	pub target: ApiTarget,
	/// Absolute path on the target service.
	pub path: String,
	/// Query parameters, appended in order.
	pub query: Vec<(String, String)>,
	/// Form body fields; sent URL-encoded on [`RequestMethod::Post`].
	pub form: BTreeMap<String, String>,
}
impl ApiRequest {
	/// Starts a GET request against the given target path.
	pub fn get(target: ApiTarget, path: impl Into<String>) -> Self {
		Self {
			method: RequestMethod::Get,
			target,
			path: path.into(),
			query: Vec::new(),
			form: BTreeMap::new(),
		}
	}

	/// Starts a POST request against the given target path.
	pub fn post(target: ApiTarget, path: impl Into<String>) -> Self {
		Self { method: RequestMethod::Post, ..Self::get(target, path) }
	}

	/// Appends one query parameter.
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Sets one form body field.
	pub fn with_form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.form.insert(key.into(), value.into());

		self
	}
}

/// Abstraction over HTTP transports capable of executing token exchanges.
///
/// The trait is the broker's only dependency on an HTTP stack. Implementations resolve the
/// request's [`ApiTarget`] to a concrete endpoint, perform the wire call, and resolve with the
/// raw response body on HTTP success; the caches decode JSON themselves via [`decode_json`] so
/// parse failures carry the offending path. Implementations must be `Send + Sync + 'static` so
/// caches can share them behind `Arc` without additional wrappers, and the returned future must
/// be `Send` for the lifetime of the in-flight exchange.
pub trait Requestor
where
	Self: 'static + Send + Sync,
{
	/// Executes the request, resolving with the raw response body on HTTP success.
	///
	/// Non-success statuses must surface as [`TransportError::Status`] and connection-level
	/// failures as [`TransportError::Network`]. Implementations never retry; the caches treat
	/// every error as fatal to the current attempt and leave cached state untouched.
	fn execute(&self, request: ApiRequest) -> RequestFuture<'_>;
}

/// Decodes a token-endpoint JSON body, naming the offending path on failure.
pub fn decode_json<T>(bytes: &[u8]) -> Result<T>
where
	T: serde::de::DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::ResponseParse { source })
}

/// Default [`Requestor`] backed by [`ReqwestClient`], holding one base URL per [`ApiTarget`].
///
/// Token requests are dispatched directly to the configured bases; configure any custom
/// [`ReqwestClient`] to disable redirect following, since token endpoints return results
/// directly instead of delegating to another URI.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestRequestor {
	client: ReqwestClient,
	gateway_base: Url,
	identity_base: Url,
}
#[cfg(feature = "reqwest")]
impl ReqwestRequestor {
	/// Builds a requestor over a default client with one base URL per target.
	pub fn new(gateway_base: Url, identity_base: Url) -> Self {
		Self { client: ReqwestClient::new(), gateway_base, identity_base }
	}

	/// Replaces the underlying [`ReqwestClient`], keeping the configured base URLs.
	pub fn with_client(mut self, client: ReqwestClient) -> Self {
		self.client = client;

		self
	}

	fn endpoint(&self, request: &ApiRequest) -> Result<Url, TransportError> {
		let base = match request.target {
			ApiTarget::Gateway => &self.gateway_base,
			ApiTarget::Identity => &self.identity_base,
		};
		let mut url = base.join(&request.path).map_err(|source| TransportError::Url { source })?;

		if !request.query.is_empty() {
			url.query_pairs_mut().extend_pairs(&request.query);
		}

		Ok(url)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestRequestor {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl Requestor for ReqwestRequestor {
	fn execute(&self, request: ApiRequest) -> RequestFuture<'_> {
		Box::pin(async move {
			let url = self.endpoint(&request)?;
			let builder = match request.method {
				RequestMethod::Get => self.client.get(url),
				RequestMethod::Post => self.client.post(url).form(&request.form),
			};
			let response = builder.send().await?;
			let status = response.status();
			let body = response.bytes().await?;

			if !status.is_success() {
				return Err(TransportError::status(
					status.as_u16(),
					String::from_utf8_lossy(&body).into_owned(),
				));
			}

			Ok(body.to_vec())
		})
	}
}
