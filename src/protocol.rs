//! Wire protocol spoken with the gateway: endpoint paths, request builders, and response DTOs.
//!
//! Field names below are the wire contract and mirror the gateway's JSON exactly. Auxiliary
//! fields are decoded so callers can inspect them, but the caches only consume the token
//! material, the expiry stamps, and the error pair.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret},
	http::{ApiRequest, ApiTarget},
};

/// Gateway path exchanging an AK/SK credential pair for an access token.
pub const ACCESS_TOKEN_PATH: &str = "/oauth/2.0/token";
/// Identity-service path issuing bearer tokens.
pub const BEARER_TOKEN_PATH: &str = "/v1/BCE-BEARER/token";
/// Query parameter requesting a bearer-token lifetime, in whole seconds.
pub const EXPIRE_IN_SECONDS_PARAM: &str = "expireInSeconds";

/// Client-credentials exchange posted to [`ACCESS_TOKEN_PATH`].
#[derive(Clone, Debug)]
pub struct AccessTokenGrant {
	client_id: String,
	client_secret: TokenSecret,
}
impl AccessTokenGrant {
	/// Grant-type discriminator sent with every exchange.
	pub const GRANT_TYPE: &'static str = "client_credentials";

	/// Builds the exchange for one credential pair.
	pub fn for_credential(credential: &Credential) -> Self {
		Self {
			client_id: credential.access_key().into(),
			client_secret: TokenSecret::new(credential.secret_key()),
		}
	}

	/// Assembles the transport request carrying the URL-encoded grant form.
	pub fn into_request(self) -> ApiRequest {
		ApiRequest::post(ApiTarget::Gateway, ACCESS_TOKEN_PATH)
			.with_form("grant_type", Self::GRANT_TYPE)
			.with_form("client_id", self.client_id)
			.with_form("client_secret", self.client_secret.expose())
	}
}

/// Assembles the bearer-token refresh request, appending [`EXPIRE_IN_SECONDS_PARAM`] only when
/// the requested expiry is a positive whole-second count.
pub fn bearer_refresh_request(requested_expiry: Duration) -> ApiRequest {
	let request = ApiRequest::get(ApiTarget::Identity, BEARER_TOKEN_PATH);
	let secs = requested_expiry.whole_seconds();

	if secs > 0 { request.with_query(EXPIRE_IN_SECONDS_PARAM, secs.to_string()) } else { request }
}

/// Gateway response to a client-credentials exchange.
///
/// The gateway reports application-level rejections inside a success status; a non-empty
/// [`error`](Self::error) marks one, and [`is_error`](Self::is_error) gates on it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccessTokenResponse {
	/// Issued access token.
	pub access_token: TokenSecret,
	/// Token lifetime in seconds, relative to issuance.
	pub expires_in: i64,
	/// Application-level error code; empty on success.
	pub error: String,
	/// Human-readable description accompanying [`error`](Self::error).
	pub error_description: String,
	/// Session key issued alongside the token.
	pub session_key: TokenSecret,
	/// Session secret issued alongside the token.
	pub session_secret: TokenSecret,
	/// Refresh token, when the gateway issues one.
	pub refresh_token: TokenSecret,
	/// Scopes attached to the token.
	pub scope: String,
}
impl AccessTokenResponse {
	/// Returns `true` when the gateway rejected the exchange inside a success status.
	pub fn is_error(&self) -> bool {
		!self.error.is_empty()
	}
}

/// Identity-service response to a bearer-token refresh.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct BearerTokenResponse {
	/// Account the token was issued for.
	#[serde(rename = "userId")]
	pub user_id: String,
	/// Issued bearer token.
	pub token: TokenSecret,
	/// Provider-reported token status.
	pub status: String,
	/// Issuance stamp as reported by the provider.
	#[serde(rename = "createTime")]
	pub create_time: String,
	/// Expiry stamp in RFC 3339 format.
	#[serde(rename = "expireTime")]
	pub expire_time: String,
}
impl BearerTokenResponse {
	/// Parses the RFC 3339 expiry stamp.
	pub fn parsed_expire_time(&self) -> Result<OffsetDateTime> {
		OffsetDateTime::parse(&self.expire_time, &Rfc3339)
			.map_err(|source| Error::ExpireTimeFormat { source })
	}
}
