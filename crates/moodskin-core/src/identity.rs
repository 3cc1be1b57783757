//! Identity domain module.
//!
//! Authentication is delegated to external providers. The core only reads
//! whether a session is present and the opaque key that namespaces the
//! remote mirror.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Opaque identity key issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Registered,
    Guest,
}

/// Profile fields reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// A present session (registered or guest). Absence is `Option::None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub key: SessionKey,
    pub kind: SessionKind,
    #[serde(default)]
    pub profile: UserProfile,
}

impl UserSession {
    pub fn guest(key: SessionKey) -> Self {
        Self {
            key,
            kind: SessionKind::Guest,
            profile: UserProfile::default(),
        }
    }

    pub fn registered(key: SessionKey, profile: UserProfile) -> Self {
        Self {
            key,
            kind: SessionKind::Registered,
            profile,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.kind == SessionKind::Guest
    }

    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        match (&self.profile.display_name, &self.profile.email) {
            (Some(name), _) if !name.is_empty() => name,
            (_, Some(email)) if !email.is_empty() => email,
            _ if self.is_guest() => "Guest",
            _ => "User",
        }
    }
}

/// How to sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInMethod {
    Password { email: String, password: String },
    /// Token obtained from a federated provider's redirect flow.
    Federated { provider: String, token: String },
    Anonymous,
}

impl SignInMethod {
    pub fn name(&self) -> &'static str {
        match self {
            SignInMethod::Password { .. } => "password",
            SignInMethod::Federated { .. } => "federated",
            SignInMethod::Anonymous => "anonymous",
        }
    }
}

/// External identity provider capability.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The current session, if any.
    async fn current_session(&self) -> Result<Option<UserSession>>;

    async fn sign_in(&self, method: SignInMethod) -> Result<UserSession>;

    /// Ends the session. Implementations clear their local state even when the
    /// provider call fails.
    async fn sign_out(&self) -> Result<()>;
}
