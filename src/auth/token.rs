//! Token models: the redacting secret wrapper, per-credential access-token entries, and the
//! single-slot bearer token.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Cached access token for one credential pair, stamped with its last confirmed refresh instant.
///
/// Entries are replaced wholesale on every successful exchange; the token and stamp are never
/// updated independently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessTokenEntry {
	/// Access token secret; callers must avoid logging it.
	pub token: TokenSecret,
	/// Instant at which the broker last confirmed this token with the gateway.
	pub refreshed_at: OffsetDateTime,
}
impl AccessTokenEntry {
	/// Stamps a freshly confirmed token with the given instant.
	pub fn new(token: TokenSecret, refreshed_at: OffsetDateTime) -> Self {
		Self { token, refreshed_at }
	}

	/// Returns the entry age at the given instant.
	pub fn age_at(&self, instant: OffsetDateTime) -> Duration {
		instant - self.refreshed_at
	}

	/// Returns `true` while the entry is strictly younger than `interval` at the given instant.
	///
	/// A `true` result suppresses a forced refresh. Plain lookups serve entries of any age and
	/// never consult this check.
	pub fn within_throttle(&self, instant: OffsetDateTime, interval: Duration) -> bool {
		self.age_at(instant) < interval
	}
}

/// Cached bearer token for the identity service, either caller-preset or gateway-issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BearerToken {
	token: TokenSecret,
	expires_at: Option<OffsetDateTime>,
	refresh_advance: Duration,
}
impl BearerToken {
	/// Wraps a caller-supplied token. Preset tokens carry no expiry and are never refreshed.
	pub fn preset(token: TokenSecret) -> Self {
		Self { token, expires_at: None, refresh_advance: Duration::ZERO }
	}

	/// Wraps a gateway-issued token with its expiry instant and the advance window within which
	/// the broker refreshes proactively.
	pub fn issued(
		token: TokenSecret,
		expires_at: OffsetDateTime,
		refresh_advance: Duration,
	) -> Self {
		Self { token, expires_at: Some(expires_at), refresh_advance }
	}

	/// Returns the token secret.
	pub fn token(&self) -> &TokenSecret {
		&self.token
	}

	/// Returns the expiry instant; `None` marks a preset token.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}

	/// Returns `true` for caller-supplied tokens that bypass refresh entirely.
	pub fn is_preset(&self) -> bool {
		self.expires_at.is_none()
	}

	/// Returns `true` once the remaining lifetime at `instant` has shrunk to the refresh advance
	/// window or below. Preset tokens never need refresh.
	pub fn needs_refresh_at(&self, instant: OffsetDateTime) -> bool {
		match self.expires_at {
			None => false,
			Some(at) => at - instant <= self.refresh_advance,
		}
	}
}
