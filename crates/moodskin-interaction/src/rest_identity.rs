//! Identity provider backed by an external account service.
//!
//! `POST {base}/sessions` exchanges credentials (password, federated token or
//! anonymous) for a session; `DELETE {base}/sessions/{key}` ends it. The
//! session is kept in the local cache between runs.

use async_trait::async_trait;
use moodskin_core::cache::KeyValueCache;
use moodskin_core::error::Result;
use moodskin_core::identity::{
    IdentityProvider, SessionKey, SessionKind, SignInMethod, UserProfile, UserSession,
};
use moodskin_infrastructure::session_cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::http::{self, Service};

const NAME: &str = "identity service";

pub struct RestIdentityProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    cache: Arc<dyn KeyValueCache>,
}

#[derive(Serialize)]
#[serde(tag = "method", rename_all = "lowercase")]
enum SignInRequest<'a> {
    Password { email: &'a str, password: &'a str },
    Federated { provider: &'a str, token: &'a str },
    Anonymous,
}

impl<'a> From<&'a SignInMethod> for SignInRequest<'a> {
    fn from(method: &'a SignInMethod) -> Self {
        match method {
            SignInMethod::Password { email, password } => SignInRequest::Password { email, password },
            SignInMethod::Federated { provider, token } => {
                SignInRequest::Federated { provider, token }
            }
            SignInMethod::Anonymous => SignInRequest::Anonymous,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    key: String,
    #[serde(default)]
    anonymous: bool,
    display_name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

impl SessionResponse {
    fn into_session(self) -> UserSession {
        UserSession {
            key: SessionKey::new(self.key),
            kind: if self.anonymous {
                SessionKind::Guest
            } else {
                SessionKind::Registered
            },
            profile: UserProfile {
                display_name: self.display_name,
                email: self.email,
                avatar_url: self.avatar_url,
            },
        }
    }
}

impl RestIdentityProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        cache: Arc<dyn KeyValueCache>,
    ) -> Self {
        Self {
            client: http::build_client(),
            base_url: base_url.into(),
            api_key,
            cache,
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn end_remote_session(&self, key: &SessionKey) -> Result<()> {
        let url = http::join_url(Service::Identity, &self.base_url, &["sessions", key.as_str()])?;
        let response = self
            .authorize(self.client.delete(url))
            .send()
            .await
            .map_err(|e| http::request_error(Service::Identity, NAME, e))?;
        if !response.status().is_success() {
            return Err(http::error_from_response(Service::Identity, NAME, response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn current_session(&self) -> Result<Option<UserSession>> {
        session_cache::load_session(self.cache.as_ref())
    }

    async fn sign_in(&self, method: SignInMethod) -> Result<UserSession> {
        let url = http::join_url(Service::Identity, &self.base_url, &["sessions"])?;
        let response = self
            .authorize(self.client.post(url))
            .json(&SignInRequest::from(&method))
            .send()
            .await
            .map_err(|e| http::request_error(Service::Identity, NAME, e))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(Service::Identity, NAME, response).await);
        }

        let parsed: SessionResponse = response
            .json()
            .await
            .map_err(|e| http::request_error(Service::Identity, NAME, e))?;
        let session = parsed.into_session();

        session_cache::store_session(self.cache.as_ref(), &session)?;
        tracing::info!(method = method.name(), key = %session.key, "Signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(session) = session_cache::load_session(self.cache.as_ref())? {
            if let Err(e) = self.end_remote_session(&session.key).await {
                tracing::warn!(error = %e, "Remote sign-out failed; clearing local session anyway");
            }
        }
        session_cache::clear_session(self.cache.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodskin_infrastructure::MemoryKeyValueCache;

    #[test]
    fn test_sign_in_request_shapes() {
        let password = SignInMethod::Password {
            email: "a@example.com".into(),
            password: "pw".into(),
        };
        let json = serde_json::to_value(SignInRequest::from(&password)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"method": "password", "email": "a@example.com", "password": "pw"})
        );

        let json = serde_json::to_value(SignInRequest::from(&SignInMethod::Anonymous)).unwrap();
        assert_eq!(json, serde_json::json!({"method": "anonymous"}));
    }

    #[test]
    fn test_session_response_mapping() {
        let parsed: SessionResponse = serde_json::from_str(
            r#"{"key": "uid-9", "displayName": "Ada", "email": "ada@example.com"}"#,
        )
        .unwrap();
        let session = parsed.into_session();
        assert_eq!(session.kind, SessionKind::Registered);
        assert_eq!(session.display_name(), "Ada");

        let guest: SessionResponse =
            serde_json::from_str(r#"{"key": "anon-1", "anonymous": true}"#).unwrap();
        assert!(guest.into_session().is_guest());
    }

    #[tokio::test]
    async fn test_sign_out_clears_cache_when_service_unreachable() {
        let cache: Arc<dyn KeyValueCache> = Arc::new(MemoryKeyValueCache::new());
        session_cache::store_session(cache.as_ref(), &UserSession::guest(SessionKey::new("g")))
            .unwrap();

        let provider = RestIdentityProvider::new("http://127.0.0.1:9", None, cache.clone());
        provider.sign_out().await.unwrap();

        assert!(provider.current_session().await.unwrap().is_none());
    }
}
