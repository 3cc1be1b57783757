//! Local persistent cache.
//!
//! A synchronous, string-keyed store. Writes complete before the caller
//! treats the in-memory state as canonical.

use crate::error::Result;

/// Cache key holding the saved-themes JSON array.
pub const SAVED_THEMES_KEY: &str = "savedThemes";
/// Cache key holding the serialized [`crate::identity::UserSession`].
pub const SESSION_KEY: &str = "session";
/// Cache key holding the last displayed mood.
pub const CURRENT_MOOD_KEY: &str = "currentMood";

pub trait KeyValueCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
