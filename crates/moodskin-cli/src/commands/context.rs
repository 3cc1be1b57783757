use anyhow::{Context as _, Result};
use moodskin_application::{AppComponents, MoodskinApp};
use moodskin_core::cache::KeyValueCache;
use moodskin_core::camera::CameraDevice;
use moodskin_core::config::RootConfig;
use moodskin_core::mood::MoodResolver;
use moodskin_infrastructure::{
    ConfigService, DirectoryCamera, FileKeyValueCache, MoodskinPaths, SecretStorage,
};
use moodskin_interaction::providers;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a command needs.
pub struct Context {
    pub app: MoodskinApp,
    pub config: RootConfig,
    pub paths: MoodskinPaths,
}

/// Loads configuration and secrets, builds the adapters and restores the session.
///
/// `frames` overrides `[camera] frames_dir`; without either the camera is disabled.
pub async fn build(home: Option<&Path>, frames: Option<PathBuf>) -> Result<Context> {
    let paths = MoodskinPaths::new(home).context("Failed to resolve moodskin directories")?;
    let config = ConfigService::new(paths.config_file())
        .load()
        .with_context(|| format!("Failed to load {}", paths.config_file().display()))?;
    let secrets = SecretStorage::new(paths.secret_file()).load()?;

    let cache: Arc<dyn KeyValueCache> = Arc::new(FileKeyValueCache::new(paths.cache_dir()));
    let identity = providers::identity_provider(&config.identity, &secrets, cache.clone())?;
    let records = providers::record_store(&config.remote, &secrets, &paths)?;
    let camera = frames
        .or_else(|| config.camera.frames_dir.clone())
        .map(|dir| Arc::new(DirectoryCamera::new(dir)) as Arc<dyn CameraDevice>);

    tracing::debug!(
        config = %paths.config_file().display(),
        text_provider = ?config.inference.text_provider,
        remote = ?config.remote.provider,
        camera = camera.is_some(),
        "Building app"
    );

    let app = MoodskinApp::new(AppComponents {
        resolver: MoodResolver::new(&config.resolver),
        identity,
        cache,
        text: providers::text_inference(&config.inference, &secrets),
        facial: providers::facial_inference(&config.inference, &secrets),
        camera,
        records,
        camera_interval: config.camera.interval(),
    });
    app.start().await?;

    Ok(Context { app, config, paths })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = build(Some(dir.path()), None).await.unwrap();

        assert!(ctx.paths.config_file().exists());
        assert_eq!(ctx.config, RootConfig::default());
        assert!(ctx.app.whoami().await.is_none());
    }
}
