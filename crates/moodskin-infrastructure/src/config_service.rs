//! Configuration service.
//!
//! Loads [`RootConfig`] from `config.toml`, writing the defaults on first run.

use moodskin_core::config::RootConfig;
use moodskin_core::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration. A missing file is created with defaults.
    pub fn load(&self) -> Result<RootConfig> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let config: RootConfig = toml::from_str(&content)?;
                tracing::debug!(path = %self.path.display(), "Loaded config");
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let config = RootConfig::default();
                self.save(&config)?;
                tracing::info!(path = %self.path.display(), "Wrote default config");
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, config: &RootConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string_pretty(config)?)?;
        Ok(())
    }
}
