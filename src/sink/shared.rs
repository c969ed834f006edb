//! Process-local token mirror retaining the most recently published tokens.

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret},
	sink::TokenSink,
};

/// Cloneable last-write-wins mirror of the most recently published tokens.
///
/// The mirror reproduces the observable behavior of a shared configuration record without the
/// global: every clone shares one slot, each publish overwrites the previous value of its kind,
/// and readers see the latest confirmed token regardless of which credential produced it.
#[derive(Clone, Debug, Default)]
pub struct SharedTokens(Arc<RwLock<SharedTokensInner>>);
impl SharedTokens {
	/// Creates an empty mirror.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the most recently published access token, if any.
	pub fn latest_access_token(&self) -> Option<TokenSecret> {
		self.0.read().access_token.clone()
	}

	/// Returns the most recently published bearer token, if any.
	pub fn latest_bearer_token(&self) -> Option<TokenSecret> {
		self.0.read().bearer_token.clone()
	}
}
impl TokenSink for SharedTokens {
	fn publish_access_token(&self, _credential: &Credential, token: &TokenSecret) {
		self.0.write().access_token = Some(token.clone());
	}

	fn publish_bearer_token(&self, token: &TokenSecret) {
		self.0.write().bearer_token = Some(token.clone());
	}
}

#[derive(Debug, Default)]
struct SharedTokensInner {
	access_token: Option<TokenSecret>,
	bearer_token: Option<TokenSecret>,
}
