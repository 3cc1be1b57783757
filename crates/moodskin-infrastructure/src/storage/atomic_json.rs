//! Atomic JSON file operations.
//!
//! Writes go to a hidden temporary file in the same directory, are synced,
//! then renamed over the target. Every write holds an exclusive advisory lock
//! on a sibling `.lock` file, so concurrent processes never share the
//! temporary file.

use moodskin_core::error::{MoodskinError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Handle to one JSON document on disk.
#[derive(Debug, Clone)]
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Missing or blank files load as `None`.
    pub fn load(&self) -> Result<Option<T>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, data: &T) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        self.write_locked(data)
    }

    /// Caller must hold the `FileLock`.
    fn write_locked(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Locked read-modify-write. `None` is passed when the file does not exist.
    pub fn update<F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(Option<T>) -> Result<T>,
    {
        let _lock = FileLock::acquire(&self.path)?;
        let updated = f(self.load()?)?;
        self.write_locked(&updated)?;
        Ok(updated)
    }

    /// Deletes the file. A missing file is not an error.
    pub fn remove(&self) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| MoodskinError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| MoodskinError::io("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock guard; released and cleaned up on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        loop {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&lock_path)?;

            #[cfg(unix)]
            {
                use fs2::FileExt;
                use std::os::unix::fs::MetadataExt;

                file.lock_exclusive()
                    .map_err(|e| MoodskinError::io(format!("Failed to acquire lock: {}", e)))?;

                // The previous holder unlinks the lock file on release; retry if
                // we locked an inode that is no longer at `lock_path`.
                let held = file.metadata()?;
                match fs::metadata(&lock_path) {
                    Ok(current) if current.dev() == held.dev() && current.ino() == held.ino() => {}
                    Ok(_) => continue,
                    Err(e) if e.kind() == ErrorKind::NotFound => continue,
                    Err(e) => return Err(e.into()),
                }
            }

            return Ok(FileLock { file, lock_path });
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        label: String,
        count: u32,
    }

    #[test]
    fn test_missing_and_blank_load_as_none() {
        let dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Counter>::new(dir.path().join("c.json"));
        assert!(file.load().unwrap().is_none());

        fs::write(file.path(), "  \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Counter>::new(dir.path().join("nested").join("c.json"));
        file.save(&Counter {
            label: "a".into(),
            count: 1,
        })
        .unwrap();

        assert!(file.exists());
        assert!(!dir.path().join("nested").join(".c.json.tmp").exists());
        assert_eq!(file.load().unwrap().unwrap().count, 1);
    }

    #[test]
    fn test_update_creates_then_modifies() {
        let dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Counter>::new(dir.path().join("c.json"));

        let bump = |current: Option<Counter>| {
            let mut counter = current.unwrap_or(Counter {
                label: "start".into(),
                count: 0,
            });
            counter.count += 5;
            Ok(counter)
        };
        file.update(bump).unwrap();
        let updated = file.update(bump).unwrap();

        assert_eq!(updated.count, 10);
        assert!(!dir.path().join("c.lock").exists());
    }

    #[test]
    fn test_update_error_keeps_file() {
        let dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Counter>::new(dir.path().join("c.json"));
        file.save(&Counter {
            label: "keep".into(),
            count: 3,
        })
        .unwrap();

        let result = file.update(|_| Err(MoodskinError::internal("abort")));
        assert!(result.is_err());
        assert_eq!(file.load().unwrap().unwrap().count, 3);
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Counter>::new(dir.path().join("c.json"));
        fs::write(file.path(), "{not json").unwrap();
        assert!(file.load().unwrap_err().is_serialization());
    }

    #[test]
    fn test_concurrent_saves_stay_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.json");

        let writers: Vec<_> = (0..8)
            .map(|writer| {
                let file = AtomicJsonFile::<Counter>::new(path.clone());
                std::thread::spawn(move || {
                    for count in 0..25 {
                        file.save(&Counter {
                            label: format!("writer-{writer}"),
                            count,
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let file = AtomicJsonFile::<Counter>::new(path);
        let last = file.load().unwrap().unwrap();
        assert!(last.label.starts_with("writer-"));
        assert_eq!(last.count, 24);
        assert!(!dir.path().join(".c.json.tmp").exists());
        assert!(!dir.path().join("c.lock").exists());
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Counter>::new(dir.path().join("c.json"));
        file.remove().unwrap();
    }
}
