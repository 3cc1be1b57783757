//! File-backed remote record store.
//!
//! One JSON document per session key under a directory. Stands in for a
//! hosted document store on single-machine setups and in tests.

use async_trait::async_trait;
use moodskin_core::error::{MoodskinError, Result};
use moodskin_core::identity::SessionKey;
use moodskin_core::record::{USER_RECORD_ENTITY, UserRecord, UserRecordStore};
use moodskin_core::saved::SavedThemeEntry;
use std::path::{Path, PathBuf};

use crate::kv_cache::file_stem;
use crate::storage::AtomicJsonFile;

#[derive(Debug, Clone)]
pub struct FileUserRecordStore {
    dir: PathBuf,
}

impl FileUserRecordStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &SessionKey) -> AtomicJsonFile<UserRecord> {
        AtomicJsonFile::new(self.dir.join(format!("{}.json", file_stem(key.as_str()))))
    }
}

/// Runs blocking file I/O off the async executor.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| MoodskinError::internal(format!("record store task failed: {}", e)))?
}

#[async_trait]
impl UserRecordStore for FileUserRecordStore {
    async fn fetch(&self, key: &SessionKey) -> Result<UserRecord> {
        let file = self.file_for(key);
        let id = key.to_string();
        blocking(move || {
            file.load()?
                .ok_or_else(|| MoodskinError::not_found(USER_RECORD_ENTITY, id))
        })
        .await
    }

    async fn create(&self, key: &SessionKey, record: &UserRecord) -> Result<()> {
        let file = self.file_for(key);
        let record = record.clone();
        tracing::debug!(key = %key, "Creating user record");
        blocking(move || file.update(|_| Ok(record)).map(|_| ())).await
    }

    async fn replace_saved_themes(
        &self,
        key: &SessionKey,
        saved_themes: &[SavedThemeEntry],
    ) -> Result<()> {
        let file = self.file_for(key);
        let id = key.to_string();
        let saved_themes = saved_themes.to_vec();
        blocking(move || {
            file.update(|current| {
                let mut record =
                    current.ok_or_else(|| MoodskinError::not_found(USER_RECORD_ENTITY, id))?;
                record.saved_themes = saved_themes;
                Ok(record)
            })
            .map(|_| ())
        })
        .await
    }
}
