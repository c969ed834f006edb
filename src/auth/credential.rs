//! Long-lived credential pair identifying one caller of the remote gateway.

// self
use crate::_prelude::*;

/// Number of leading access-key characters preserved by [`mask_access_key`].
const MASK_VISIBLE_CHARS: usize = 6;

/// Immutable access-key/secret-key pair.
///
/// The pair is used verbatim as the access-token cache key: equality and hashing compare both
/// fields exactly, with no normalization or validation. The remote gateway is the sole authority
/// on whether a pair is well formed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential {
	access_key: String,
	secret_key: String,
}
impl Credential {
	/// Wraps an access-key/secret-key pair.
	pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
		Self { access_key: access_key.into(), secret_key: secret_key.into() }
	}

	/// Returns the access key. Prefer [`Self::masked_access_key`] in log output.
	pub fn access_key(&self) -> &str {
		&self.access_key
	}

	/// Returns the secret key. Callers must avoid logging this string.
	pub fn secret_key(&self) -> &str {
		&self.secret_key
	}

	/// Returns the masked access-key form safe for log output.
	pub fn masked_access_key(&self) -> String {
		mask_access_key(&self.access_key)
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_key", &self.masked_access_key())
			.field("secret_key", &"<redacted>")
			.finish()
	}
}

/// Masks an access key for log output, keeping the first six characters and replacing the
/// remainder with `"******"`.
///
/// Keys shorter than six characters are returned unmasked. This is a logging aid matching the
/// gateway's own diagnostics convention, not a security boundary. Counting is by character, so
/// multi-byte input is never split mid code point.
pub fn mask_access_key(value: &str) -> String {
	if value.chars().count() < MASK_VISIBLE_CHARS {
		return value.into();
	}

	let visible = value.chars().take(MASK_VISIBLE_CHARS).collect::<String>();

	format!("{visible}******")
}
