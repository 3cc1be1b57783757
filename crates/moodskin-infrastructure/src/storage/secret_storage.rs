//! Secret configuration storage.
//!
//! Loads API keys from `secret.json`. Providers missing from the file are
//! filled in from environment variables.

use moodskin_core::config::{ApiKeyConfig, SecretConfig};
use moodskin_core::error::Result;
use std::path::{Path, PathBuf};

use super::atomic_json::AtomicJsonFile;

pub const HUGGINGFACE_KEY_ENV: &str = "HF_API_KEY";
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";
pub const REMOTE_KEY_ENV: &str = "MOODSKIN_REMOTE_KEY";
pub const IDENTITY_KEY_ENV: &str = "MOODSKIN_IDENTITY_KEY";

/// Read-only access to `secret.json`.
///
/// The file is plaintext JSON; keep its permissions at 600.
pub struct SecretStorage {
    file: AtomicJsonFile<SecretConfig>,
}

impl SecretStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads secrets from the file, then from the environment.
    ///
    /// A missing file is not an error.
    pub fn load(&self) -> Result<SecretConfig> {
        let from_file = self.file.load()?.unwrap_or_default();
        Ok(merge_env(from_file, |name| std::env::var(name).ok()))
    }
}

/// Fills providers absent from `config` using `lookup` (normally `std::env::var`).
fn merge_env<F>(mut config: SecretConfig, lookup: F) -> SecretConfig
where
    F: Fn(&str) -> Option<String>,
{
    let from_env = |name: &str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| {
                tracing::debug!("Using {} from environment", name);
                ApiKeyConfig::new(value)
            })
    };

    if config.huggingface.is_none() {
        config.huggingface = from_env(HUGGINGFACE_KEY_ENV);
    }
    if config.gemini.is_none() {
        config.gemini = from_env(GEMINI_KEY_ENV);
    }
    if config.remote.is_none() {
        config.remote = from_env(REMOTE_KEY_ENV);
    }
    if config.identity.is_none() {
        config.identity = from_env(IDENTITY_KEY_ENV);
    }
    config
}
