//! Persists the signed-in [`UserSession`] in the local cache.

use moodskin_core::cache::{KeyValueCache, SESSION_KEY};
use moodskin_core::error::Result;
use moodskin_core::identity::UserSession;

/// Reads the cached session. A corrupt entry is dropped and treated as signed out.
pub fn load_session(cache: &dyn KeyValueCache) -> Result<Option<UserSession>> {
    let Some(raw) = cache.get(SESSION_KEY)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(session) => Ok(Some(session)),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable cached session");
            cache.remove(SESSION_KEY)?;
            Ok(None)
        }
    }
}

pub fn store_session(cache: &dyn KeyValueCache, session: &UserSession) -> Result<()> {
    cache.set(SESSION_KEY, &serde_json::to_string(session)?)
}

pub fn clear_session(cache: &dyn KeyValueCache) -> Result<()> {
    cache.remove(SESSION_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv_cache::MemoryKeyValueCache;
    use moodskin_core::identity::SessionKey;

    #[test]
    fn test_store_load_clear() {
        let cache = MemoryKeyValueCache::new();
        assert!(load_session(&cache).unwrap().is_none());

        let session = UserSession::guest(SessionKey::new("g-1"));
        store_session(&cache, &session).unwrap();
        assert_eq!(load_session(&cache).unwrap(), Some(session));

        clear_session(&cache).unwrap();
        assert!(load_session(&cache).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_session_is_discarded() {
        let cache = MemoryKeyValueCache::new();
        cache.set(SESSION_KEY, "not-json").unwrap();

        assert!(load_session(&cache).unwrap().is_none());
        assert!(cache.get(SESSION_KEY).unwrap().is_none());
    }
}
