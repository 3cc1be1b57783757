//! Local identity provider.
//!
//! Issues anonymous guest sessions keyed by a random UUID and keeps them in
//! the local cache. Password and federated sign-in need an external account
//! service (see the REST provider in `moodskin-interaction`).

use async_trait::async_trait;
use moodskin_core::cache::KeyValueCache;
use moodskin_core::error::{MoodskinError, Result};
use moodskin_core::identity::{IdentityProvider, SessionKey, SignInMethod, UserSession};
use std::sync::Arc;
use uuid::Uuid;

use crate::session_cache;

pub struct LocalIdentityProvider {
    cache: Arc<dyn KeyValueCache>,
}

impl LocalIdentityProvider {
    pub fn new(cache: Arc<dyn KeyValueCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn current_session(&self) -> Result<Option<UserSession>> {
        session_cache::load_session(self.cache.as_ref())
    }

    async fn sign_in(&self, method: SignInMethod) -> Result<UserSession> {
        match method {
            SignInMethod::Anonymous => {
                let session = UserSession::guest(SessionKey::new(Uuid::new_v4().to_string()));
                session_cache::store_session(self.cache.as_ref(), &session)?;
                tracing::info!(key = %session.key, "Started guest session");
                Ok(session)
            }
            other => Err(MoodskinError::identity(format!(
                "{} sign-in needs an external identity provider; set [identity] provider = \"rest\"",
                other.name()
            ))),
        }
    }

    async fn sign_out(&self) -> Result<()> {
        session_cache::clear_session(self.cache.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv_cache::MemoryKeyValueCache;

    #[tokio::test]
    async fn test_anonymous_session_persists() {
        let cache: Arc<dyn KeyValueCache> = Arc::new(MemoryKeyValueCache::new());
        let provider = LocalIdentityProvider::new(cache.clone());

        assert!(provider.current_session().await.unwrap().is_none());

        let session = provider.sign_in(SignInMethod::Anonymous).await.unwrap();
        assert!(session.is_guest());
        assert_eq!(session.key.as_str().len(), 36);

        let again = LocalIdentityProvider::new(cache);
        assert_eq!(again.current_session().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let provider = LocalIdentityProvider::new(Arc::new(MemoryKeyValueCache::new()));
        provider.sign_in(SignInMethod::Anonymous).await.unwrap();
        provider.sign_out().await.unwrap();
        assert!(provider.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_password_sign_in_is_rejected() {
        let provider = LocalIdentityProvider::new(Arc::new(MemoryKeyValueCache::new()));
        let err = provider
            .sign_in(SignInMethod::Password {
                email: "a@example.com".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MoodskinError::Identity(_)));
        assert!(provider.current_session().await.unwrap().is_none());
    }
}
