//! Process-local token broker for AK/SK-fronted API gateways: throttled, stampede-free
//! access-token refresh plus a preset-or-self-renewing bearer slot, all behind one injectable
//! transport seam.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]
#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod auth;
pub mod cache;
pub mod error;
pub mod http;
pub mod obs;
pub mod protocol;
pub mod sink;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		cache::{ReqwestAccessTokenCache, ReqwestBearerTokenCache},
		http::ReqwestRequestor,
		sink::{SharedTokens, TokenSink},
	};

	/// Builds a requestor pointing both upstream targets at one mock server base.
	pub fn test_requestor(base: &str) -> ReqwestRequestor {
		let base = Url::parse(base).expect("Test base URL should parse.");

		ReqwestRequestor::new(base.clone(), base)
	}

	/// Constructs an access-token cache wired to a mock server, plus the mirror observing it.
	pub fn build_test_access_cache(base: &str) -> (ReqwestAccessTokenCache, SharedTokens) {
		let mirror = SharedTokens::new();
		let sink: Arc<dyn TokenSink> = Arc::new(mirror.clone());
		let cache = ReqwestAccessTokenCache::new(test_requestor(base), sink);

		(cache, mirror)
	}

	/// Constructs a bearer-token cache wired to a mock server, plus the mirror observing it.
	pub fn build_test_bearer_cache(base: &str) -> (ReqwestBearerTokenCache, SharedTokens) {
		let mirror = SharedTokens::new();
		let sink: Arc<dyn TokenSink> = Arc::new(mirror.clone());
		let cache = ReqwestBearerTokenCache::new(test_requestor(base), sink);

		(cache, mirror)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
