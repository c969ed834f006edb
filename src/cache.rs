//! Token caches: per-credential access tokens and the single-slot bearer token.
//!
//! Both caches follow the same discipline. Entry storage sits behind a synchronous lock that is
//! never held across an await; the upstream exchange runs under an async singleflight guard that
//! is scoped per credential (access) or per slot (bearer), so a refresh storm collapses to one
//! upstream call while unrelated credentials proceed concurrently. Losers of the race re-check
//! the cache under the guard and are served from the freshly written entry. Every failure leaves
//! the cached state exactly as it was.

pub mod access;
pub mod bearer;
pub mod metrics;

mod common;

pub use access::*;
pub use bearer::*;
pub use metrics::*;

#[cfg(feature = "reqwest")]
use crate::http::ReqwestRequestor;

#[cfg(feature = "reqwest")]
/// Access-token cache specialized for the crate's default reqwest transport.
pub type ReqwestAccessTokenCache = AccessTokenCache<ReqwestRequestor>;
#[cfg(feature = "reqwest")]
/// Bearer-token cache specialized for the crate's default reqwest transport.
pub type ReqwestBearerTokenCache = BearerTokenCache<ReqwestRequestor>;

#[cfg(test)]
pub(crate) mod stub {
	//! Scripted [`Requestor`] used by cache unit tests.

	// std
	use std::{
		collections::VecDeque,
		sync::atomic::{AtomicU64, Ordering},
	};
	// self
	use crate::{
		_prelude::*,
		error::TransportError,
		http::{ApiRequest, RequestFuture, Requestor},
	};

	/// Replays scripted responses in order and records every request it receives.
	pub(crate) struct ScriptedRequestor {
		responses: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
		calls: AtomicU64,
		requests: Mutex<Vec<ApiRequest>>,
	}
	impl ScriptedRequestor {
		pub(crate) fn new(
			responses: impl IntoIterator<Item = Result<Vec<u8>, TransportError>>,
		) -> Self {
			Self {
				responses: Mutex::new(responses.into_iter().collect()),
				calls: AtomicU64::new(0),
				requests: Mutex::new(Vec::new()),
			}
		}

		pub(crate) fn json(payload: serde_json::Value) -> Result<Vec<u8>, TransportError> {
			Ok(payload.to_string().into_bytes())
		}

		pub(crate) fn calls(&self) -> u64 {
			self.calls.load(Ordering::Relaxed)
		}

		pub(crate) fn last_request(&self) -> Option<ApiRequest> {
			self.requests.lock().last().cloned()
		}
	}
	impl Requestor for ScriptedRequestor {
		fn execute(&self, request: ApiRequest) -> RequestFuture<'_> {
			self.calls.fetch_add(1, Ordering::Relaxed);
			self.requests.lock().push(request);

			let response = self
				.responses
				.lock()
				.pop_front()
				.unwrap_or_else(|| Err(TransportError::status(500, "script exhausted".into())));

			Box::pin(async move { response })
		}
	}
}
