//! Observer contract notified after every confirmed token refresh.
//!
//! The sink replaces ambient shared state: instead of the caches writing freshly issued tokens
//! into a process-global record, the composition root passes in a [`TokenSink`] and decides what
//! the notifications feed, be it a shared mirror ([`SharedTokens`]), a metrics pipeline, or
//! nothing ([`NullSink`]).

/// Process-local last-write-wins mirror.
pub mod shared;

pub use shared::*;

// self
use crate::auth::{Credential, TokenSecret};

/// Observer notified after every confirmed token refresh.
///
/// Notifications fire only after the cache has accepted the new token; failed exchanges never
/// reach the sink. Implementations must return quickly, since calls run inside the refresh path
/// while the per-key guard is held, and must not call back into the caches.
pub trait TokenSink
where
	Self: Send + Sync,
{
	/// Publishes a freshly confirmed access token for `credential`.
	fn publish_access_token(&self, credential: &Credential, token: &TokenSecret);

	/// Publishes a freshly confirmed bearer token.
	fn publish_bearer_token(&self, token: &TokenSecret);
}

/// Sink that drops every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;
impl TokenSink for NullSink {
	fn publish_access_token(&self, _: &Credential, _: &TokenSecret) {}

	fn publish_bearer_token(&self, _: &TokenSecret) {}
}
