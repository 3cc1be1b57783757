//! Local key-value cache adapters.

use chrono::{DateTime, Utc};
use moodskin_core::cache::KeyValueCache;
use moodskin_core::error::{MoodskinError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::storage::AtomicJsonFile;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    key: String,
    value: String,
    updated_at: DateTime<Utc>,
}

/// Directory-backed cache: one atomically written JSON file per key.
#[derive(Debug, Clone)]
pub struct FileKeyValueCache {
    dir: PathBuf,
}

impl FileKeyValueCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> AtomicJsonFile<CacheEntry> {
        AtomicJsonFile::new(self.dir.join(format!("{}.json", file_stem(key))))
    }
}

/// Maps a cache key onto a safe file stem.
pub(crate) fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl KeyValueCache for FileKeyValueCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.file_for(key).load()? {
            Some(entry) if entry.key == key => Ok(Some(entry.value)),
            Some(entry) => {
                tracing::warn!(expected = key, found = %entry.key, "Cache file key mismatch");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.file_for(key).save(&CacheEntry {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: Utc::now(),
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.file_for(key).remove()
    }
}

/// Process-local cache; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryKeyValueCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| MoodskinError::internal("memory cache lock poisoned"))
    }
}

impl KeyValueCache for MemoryKeyValueCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodskin_core::cache::{SAVED_THEMES_KEY, SESSION_KEY};
    use tempfile::TempDir;

    fn exercise(cache: &dyn KeyValueCache) {
        assert_eq!(cache.get(SAVED_THEMES_KEY).unwrap(), None);

        cache.set(SAVED_THEMES_KEY, "[]").unwrap();
        cache.set(SESSION_KEY, "{\"key\":\"g\"}").unwrap();
        assert_eq!(cache.get(SAVED_THEMES_KEY).unwrap().as_deref(), Some("[]"));

        cache.set(SAVED_THEMES_KEY, "[1]").unwrap();
        assert_eq!(cache.get(SAVED_THEMES_KEY).unwrap().as_deref(), Some("[1]"));

        cache.remove(SAVED_THEMES_KEY).unwrap();
        cache.remove(SAVED_THEMES_KEY).unwrap();
        assert_eq!(cache.get(SAVED_THEMES_KEY).unwrap(), None);
        assert!(cache.get(SESSION_KEY).unwrap().is_some());
    }

    #[test]
    fn test_memory_cache() {
        exercise(&MemoryKeyValueCache::new());
    }

    #[test]
    fn test_file_cache() {
        let dir = TempDir::new().unwrap();
        exercise(&FileKeyValueCache::new(dir.path().join("cache")));
    }

    #[test]
    fn test_file_cache_survives_reopen() {
        let dir = TempDir::new().unwrap();
        FileKeyValueCache::new(dir.path().to_path_buf())
            .set("currentMood", "joy")
            .unwrap();

        let reopened = FileKeyValueCache::new(dir.path().to_path_buf());
        assert_eq!(reopened.get("currentMood").unwrap().as_deref(), Some("joy"));
    }

    #[test]
    fn test_file_stem_sanitizes() {
        assert_eq!(file_stem("savedThemes"), "savedThemes");
        assert_eq!(file_stem("../etc/passwd"), "___etc_passwd");
    }
}
