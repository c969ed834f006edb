//! Shared helpers for the cache implementations.

// self
use crate::{_prelude::*, auth::Credential};

/// Returns (and creates on demand) the singleflight guard for a credential.
///
/// Guard entries are never evicted; the map is bounded by the distinct credentials seen, exactly
/// like the token entries themselves.
pub(crate) fn refresh_guard(
	guards: &Mutex<HashMap<Credential, Arc<AsyncMutex<()>>>>,
	credential: &Credential,
) -> Arc<AsyncMutex<()>> {
	let mut guards = guards.lock();

	guards.entry(credential.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
}
