//! Remote per-user record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identity::{SessionKey, UserSession};
use crate::saved::SavedThemeEntry;

/// Entity type reported by [`crate::MoodskinError::NotFound`] for missing records.
pub const USER_RECORD_ENTITY: &str = "user_record";

/// The remote document keyed by session key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub saved_themes: Vec<SavedThemeEntry>,
    /// RFC 3339 creation timestamp.
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl UserRecord {
    /// A fresh record for `session` holding `saved_themes`.
    pub fn for_session(
        session: &UserSession,
        saved_themes: Vec<SavedThemeEntry>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            saved_themes,
            created_at: created_at.into(),
            email: session.profile.email.clone(),
            display_name: session.profile.display_name.clone(),
        }
    }
}

/// Keyed get/create/replace of a per-user record.
#[async_trait]
pub trait UserRecordStore: Send + Sync {
    /// Fetches the record. A missing record is `Err(NotFound)`, distinct from
    /// transport failures.
    async fn fetch(&self, key: &SessionKey) -> Result<UserRecord>;

    async fn create(&self, key: &SessionKey, record: &UserRecord) -> Result<()>;

    /// Replaces the whole `savedThemes` sequence of an existing record.
    async fn replace_saved_themes(
        &self,
        key: &SessionKey,
        saved_themes: &[SavedThemeEntry],
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UserProfile;

    #[test]
    fn test_record_wire_names() {
        let session = UserSession::registered(
            SessionKey::new("u1"),
            UserProfile {
                display_name: Some("Ada".into()),
                email: Some("ada@example.com".into()),
                avatar_url: None,
            },
        );
        let record = UserRecord::for_session(&session, Vec::new(), "2026-01-01T00:00:00Z");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["savedThemes"], serde_json::json!([]));
        assert_eq!(value["createdAt"], "2026-01-01T00:00:00Z");
        assert_eq!(value["displayName"], "Ada");
    }

    #[test]
    fn test_record_tolerates_missing_fields() {
        let record: UserRecord = serde_json::from_str("{}").unwrap();
        assert!(record.saved_themes.is_empty());
        assert!(record.email.is_none());
    }
}
