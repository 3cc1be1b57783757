//! Configuration model.
//!
//! `config.toml` deserializes into [`RootConfig`]; every section and field has a
//! default so a partial or missing file is valid. API keys live separately in
//! [`SecretConfig`] (`secret.json`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default love trigger words.
pub const DEFAULT_LOVE_TRIGGERS: [&str; 5] = ["love", "affection", "romantic", "heart", "crush"];

pub const DEFAULT_CAMERA_INTERVAL_MS: u64 = 800;

pub const DEFAULT_HUGGINGFACE_MODEL_URL: &str =
    "https://router.huggingface.co/hf-inference/models/j-hartmann/emotion-english-distilroberta-base";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// What an unrecognized label resolves to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Unrecognized labels become `neutral`.
    #[default]
    Neutral,
    /// Unrecognized labels leave the mood unset; the default theme is shown.
    DefaultTheme,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    pub fallback: FallbackPolicy,
    pub love_triggers: Vec<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::default(),
            love_triggers: DEFAULT_LOVE_TRIGGERS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub interval_ms: u64,
    /// Directory of frames replayed by the directory camera.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_dir: Option<PathBuf>,
}

impl CameraSettings {
    /// Sampling interval; zero is clamped to one millisecond.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_CAMERA_INTERVAL_MS,
            frames_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextProvider {
    #[default]
    Huggingface,
    Gemini,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    pub text_provider: TextProvider,
    pub huggingface_model_url: String,
    pub gemini_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facial_endpoint: Option<String>,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            text_provider: TextProvider::default(),
            huggingface_model_url: DEFAULT_HUGGINGFACE_MODEL_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            facial_endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProviderKind {
    /// Anonymous guests only, no network.
    #[default]
    Local,
    Rest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    pub provider: IdentityProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteProviderKind {
    /// No mirror; saved themes live in the local cache only.
    None,
    #[default]
    File,
    Rest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub provider: RemoteProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Overrides `<data dir>/records` for the file store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_dir: Option<PathBuf>,
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    pub resolver: ResolverSettings,
    pub camera: CameraSettings,
    pub inference: InferenceSettings,
    pub identity: IdentitySettings,
    pub remote: RemoteSettings,
}

/// One provider's credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl ApiKeyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model_name: None,
        }
    }
}

/// Contents of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub huggingface: Option<ApiKeyConfig>,
    #[serde(default)]
    pub gemini: Option<ApiKeyConfig>,
    #[serde(default)]
    pub remote: Option<ApiKeyConfig>,
    #[serde(default)]
    pub identity: Option<ApiKeyConfig>,
}
