//! Unified path management for moodskin files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/moodskin/          # Config directory
//! ├── config.toml              # Application configuration
//! └── secret.json              # API keys
//!
//! ~/.local/share/moodskin/     # Data directory
//! ├── cache/                   # Local key-value cache (one JSON file per key)
//! └── records/                 # File-backed remote record store
//! ```

use moodskin_core::error::{MoodskinError, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "moodskin";

/// Resolved moodskin directories.
///
/// `MoodskinPaths::new(Some(base))` roots both directories under `base`,
/// which is what tests and `--home` overrides use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodskinPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl MoodskinPaths {
    pub fn new(base: Option<&Path>) -> Result<Self> {
        match base {
            Some(base) => Ok(Self {
                config_dir: base.join("config"),
                data_dir: base.join("data"),
            }),
            None => {
                let config_dir = dirs::config_dir()
                    .ok_or_else(|| MoodskinError::config("Cannot find config directory"))?
                    .join(APP_DIR);
                let data_dir = dirs::data_dir()
                    .ok_or_else(|| MoodskinError::config("Cannot find data directory"))?
                    .join(APP_DIR);
                Ok(Self {
                    config_dir,
                    data_dir,
                })
            }
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Ensure this file has restrictive permissions (600).
    pub fn secret_file(&self) -> PathBuf {
        self.config_dir.join("secret.json")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join("records")
    }
}
