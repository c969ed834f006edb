//! Broker-level error types shared across caches, the wire protocol, and transports.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
///
/// Every failure leaves the originating cache untouched; the caller decides whether and when to
/// retry by invoking the operation again.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Transport failure (DNS, TCP, TLS, HTTP status, URL assembly).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint responded with JSON that could not be decoded.
	#[error("Token endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure naming the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
	/// Token endpoint answered the exchange with an application-level error payload.
	#[error("Token endpoint rejected the exchange ({code}): {description}.")]
	Api {
		/// Provider-supplied error code.
		code: String,
		/// Provider-supplied human-readable description.
		description: String,
	},
	/// Bearer token response carried an expiry stamp that is not valid RFC 3339.
	#[error("Bearer token response carried a malformed expiry stamp.")]
	ExpireTimeFormat {
		/// Underlying parsing failure.
		#[source]
		source: time::error::Parse,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Token endpoint answered with a non-success HTTP status.
	#[error("Token endpoint answered with HTTP {status}: {body}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body preview, truncated to [`BODY_PREVIEW_LIMIT`] characters.
		body: String,
	},
	/// Endpoint URL could not be assembled from the base and path.
	#[error("Token endpoint URL could not be assembled.")]
	Url {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds a status error, truncating the response body to a bounded preview.
	pub fn status(status: u16, body: String) -> Self {
		Self::Status { status, body: truncate_preview(body) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Maximum number of characters retained from an upstream body in error messages.
pub const BODY_PREVIEW_LIMIT: usize = 256;

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}
