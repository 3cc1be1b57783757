//! Application facade.
//!
//! [`MoodskinApp`] wires the mood session, the theme store, the camera
//! controller and the identity provider together, and gates the operations
//! that need a signed-in (registered or guest) session.

use moodskin_core::CanonicalMood;
use moodskin_core::cache::{CURRENT_MOOD_KEY, KeyValueCache};
use moodskin_core::camera::CameraDevice;
use moodskin_core::error::Result;
use moodskin_core::identity::{IdentityProvider, SignInMethod, UserSession};
use moodskin_core::inference::{FacialMoodInference, TextMoodInference};
use moodskin_core::mood::MoodResolver;
use moodskin_core::notice::Notice;
use moodskin_core::record::UserRecordStore;
use moodskin_core::saved::{SaveOutcome, SavedThemeEntry, SavedThemes};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};

use crate::camera::{CameraController, CameraSampler, SampleEvent, SampleOutcome};
use crate::mirror::RemoteMirror;
use crate::mood_session::{DetectOutcome, DisplayState, MoodSession};
use crate::theme_store::ThemeStore;

/// Collaborators the app is built from.
pub struct AppComponents {
    pub resolver: MoodResolver,
    pub identity: Arc<dyn IdentityProvider>,
    pub cache: Arc<dyn KeyValueCache>,
    pub text: Arc<dyn TextMoodInference>,
    pub facial: Arc<dyn FacialMoodInference>,
    /// `None` disables the camera.
    pub camera: Option<Arc<dyn CameraDevice>>,
    /// `None` keeps saved themes on this device only.
    pub records: Option<Arc<dyn UserRecordStore>>,
    pub camera_interval: Duration,
}

pub struct MoodskinApp {
    identity: Arc<dyn IdentityProvider>,
    cache: Arc<dyn KeyValueCache>,
    session: Arc<MoodSession>,
    themes: ThemeStore,
    camera: Option<Arc<CameraController>>,
    camera_interval: Duration,
    user: RwLock<Option<UserSession>>,
}

impl MoodskinApp {
    /// Builds the app. Must be called inside a Tokio runtime when a record
    /// store is configured, since the mirror worker is spawned here.
    pub fn new(components: AppComponents) -> Self {
        let session = Arc::new(MoodSession::new(components.resolver, components.text));
        let mirror = components.records.map(RemoteMirror::spawn);
        let themes = ThemeStore::new(components.cache.clone(), mirror);
        let camera = components.camera.map(|device| {
            Arc::new(CameraController::new(
                device,
                components.facial,
                session.clone(),
            ))
        });

        Self {
            identity: components.identity,
            cache: components.cache,
            session,
            themes,
            camera,
            camera_interval: components.camera_interval,
            user: RwLock::new(None),
        }
    }

    /// Restores the cached session, its saved themes and the last displayed mood.
    pub async fn start(&self) -> Result<Option<UserSession>> {
        let current = self.identity.current_session().await?;
        if let Some(session) = &current {
            self.themes.bind_session(session).await?;
            tracing::info!(key = %session.key, guest = session.is_guest(), "Restored session");
        }
        *self.user.write().await = current.clone();

        if let Some(mood) = self.load_current_mood() {
            self.session.set_mood(Some(mood)).await;
        }
        Ok(current)
    }

    /// Signs in. Switching to a different identity first drops the previous
    /// identity's local saved themes and mood, as sign-out would.
    pub async fn sign_in(&self, method: SignInMethod) -> Result<UserSession> {
        let session = self.identity.sign_in(method).await?;

        let previous = self.user.read().await.clone();
        if let Some(previous) = previous.filter(|p| p.key != session.key) {
            tracing::info!(from = %previous.key, to = %session.key, "Switching identity");
            self.themes.flush().await;
            *self.user.write().await = None;
            self.forget_local_state().await?;
        }

        self.themes.bind_session(&session).await?;
        *self.user.write().await = Some(session.clone());
        tracing::info!(key = %session.key, guest = session.is_guest(), "Signed in");
        Ok(session)
    }

    /// Signs out and drops every local trace of the session. Remote data is kept.
    pub async fn sign_out(&self) -> Result<()> {
        if let Err(e) = self.identity.sign_out().await {
            tracing::warn!(error = %e, "Identity provider sign-out failed; clearing local session anyway");
        }
        self.stop_camera().await;
        self.themes.flush().await;
        *self.user.write().await = None;
        self.forget_local_state().await?;
        tracing::info!("Signed out");
        Ok(())
    }

    async fn forget_local_state(&self) -> Result<()> {
        self.session.reset().await;
        self.themes.forget_local().await?;
        self.cache.remove(CURRENT_MOOD_KEY)?;
        Ok(())
    }

    pub async fn whoami(&self) -> Option<UserSession> {
        self.user.read().await.clone()
    }

    async fn require_session(&self) -> Result<UserSession> {
        self.whoami()
            .await
            .ok_or_else(|| Notice::SignInRequired.into())
    }

    pub async fn display(&self) -> DisplayState {
        self.session.current().await
    }

    pub async fn detect_text(&self, text: &str) -> Result<DetectOutcome> {
        self.require_session().await?;
        let outcome = self.session.detect_from_text(text).await?;
        if let DetectOutcome::Applied(state) = &outcome {
            self.store_current_mood(state.mood)?;
        }
        Ok(outcome)
    }

    pub async fn reset(&self) -> Result<DisplayState> {
        let state = self.session.reset().await;
        self.store_current_mood(None)?;
        Ok(state)
    }

    /// Saves the displayed mood's theme.
    pub async fn save_current(&self) -> Result<SaveOutcome> {
        self.require_session().await?;
        let state = self.session.current().await;
        self.themes.save_current(state.mood, &state.theme).await
    }

    pub async fn saved(&self) -> SavedThemes {
        self.themes.snapshot().await
    }

    pub async fn remove_saved(&self, index: usize) -> Result<Option<SavedThemeEntry>> {
        self.themes.remove(index).await
    }

    pub async fn clear_saved(&self) -> Result<()> {
        self.themes.clear_all().await
    }

    /// Re-renders with the saved entry at `index`. Out of bounds returns `None`.
    pub async fn apply_saved(&self, index: usize) -> Result<Option<DisplayState>> {
        self.require_session().await?;
        let Some(entry) = self.themes.get(index).await else {
            tracing::warn!(index, "No saved theme at index");
            return Ok(None);
        };

        let state = self.session.apply_saved(&entry).await;
        self.store_current_mood(state.mood)?;
        Ok(Some(state))
    }

    /// Writes the saved sequence as pretty JSON to `path`.
    pub async fn export_saved(&self, path: &Path) -> Result<PathBuf> {
        self.require_session().await?;
        let json = self.themes.export_json().await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, json).await?;
        tracing::info!(path = %path.display(), "Exported saved themes");
        Ok(path.to_path_buf())
    }

    fn camera(&self) -> Result<&Arc<CameraController>> {
        self.camera
            .as_ref()
            .ok_or_else(|| Notice::CameraUnavailable.into())
    }

    pub async fn start_camera(&self) -> Result<()> {
        self.require_session().await?;
        self.camera()?.start().await
    }

    pub async fn stop_camera(&self) {
        if let Some(camera) = &self.camera {
            camera.stop().await;
        }
    }

    pub async fn sample_camera(&self) -> Result<SampleOutcome> {
        let outcome = self.camera()?.sample_once().await?;
        if let SampleOutcome::Applied(state) = &outcome {
            self.store_current_mood(state.mood)?;
        }
        Ok(outcome)
    }

    /// Starts periodic sampling at the configured interval. The camera must be started.
    pub fn spawn_camera_sampler(
        &self,
        max_ticks: Option<u64>,
        events: Option<mpsc::UnboundedSender<SampleEvent>>,
    ) -> Result<CameraSampler> {
        Ok(self
            .camera()?
            .spawn_sampler(self.camera_interval, max_ticks, events))
    }

    /// Persists the displayed mood so the next process starts from it.
    pub async fn remember_display(&self) -> Result<()> {
        let state = self.session.current().await;
        self.store_current_mood(state.mood)
    }

    /// Waits for queued remote writes.
    pub async fn flush(&self) {
        self.themes.flush().await;
    }

    fn store_current_mood(&self, mood: Option<CanonicalMood>) -> Result<()> {
        match mood {
            Some(mood) => self.cache.set(CURRENT_MOOD_KEY, mood.as_ref()),
            None => self.cache.remove(CURRENT_MOOD_KEY),
        }
    }

    fn load_current_mood(&self) -> Option<CanonicalMood> {
        let raw = match self.cache.get(CURRENT_MOOD_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read the last displayed mood");
                return None;
            }
        };
        match CanonicalMood::from_str(&raw) {
            Ok(mood) => Some(mood),
            Err(_) => {
                tracing::warn!(value = %raw, "Ignoring unknown cached mood");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::tests::RecordingStore;
    use async_trait::async_trait;
    use moodskin_core::cache::SAVED_THEMES_KEY;
    use moodskin_core::camera::Frame;
    use moodskin_core::inference::{FacialSample, LabelScore, TextInference};
    use moodskin_infrastructure::{LocalIdentityProvider, MemoryKeyValueCache};

    struct KeywordInference;

    #[async_trait]
    impl TextMoodInference for KeywordInference {
        fn provider(&self) -> &str {
            "keyword"
        }

        async fn classify(&self, text: &str) -> Result<TextInference> {
            let label = if text.contains("sunny") { "joy" } else { "sadness" };
            Ok(TextInference::Scores(vec![LabelScore::new(label, 0.9)]))
        }
    }

    struct NoFace;

    #[async_trait]
    impl FacialMoodInference for NoFace {
        fn provider(&self) -> &str {
            "none"
        }

        async fn analyze(&self, _frame: &Frame) -> Result<FacialSample> {
            Ok(FacialSample::NoFace)
        }
    }

    fn app_with(
        cache: Arc<MemoryKeyValueCache>,
        records: Option<Arc<RecordingStore>>,
    ) -> MoodskinApp {
        MoodskinApp::new(AppComponents {
            resolver: MoodResolver::default(),
            identity: Arc::new(LocalIdentityProvider::new(cache.clone())),
            cache,
            text: Arc::new(KeywordInference),
            facial: Arc::new(NoFace),
            camera: None,
            records: records.map(|r| r as Arc<dyn UserRecordStore>),
            camera_interval: Duration::from_millis(800),
        })
    }

    #[tokio::test]
    async fn test_gated_operations_need_session() {
        let app = app_with(Arc::new(MemoryKeyValueCache::new()), None);
        assert!(app.start().await.unwrap().is_none());

        let notice = |r: Result<()>| r.unwrap_err().as_notice();
        assert_eq!(
            notice(app.detect_text("sunny").await.map(drop)),
            Some(Notice::SignInRequired)
        );
        assert_eq!(
            notice(app.save_current().await.map(drop)),
            Some(Notice::SignInRequired)
        );
        assert_eq!(
            notice(app.apply_saved(0).await.map(drop)),
            Some(Notice::SignInRequired)
        );
        assert_eq!(
            notice(app.export_saved(Path::new("out.json")).await.map(drop)),
            Some(Notice::SignInRequired)
        );
    }

    #[tokio::test]
    async fn test_detect_then_save_across_restarts() {
        let cache = Arc::new(MemoryKeyValueCache::new());
        let app = app_with(cache.clone(), None);
        app.sign_in(SignInMethod::Anonymous).await.unwrap();

        assert!(matches!(
            app.detect_text("a sunny day").await.unwrap(),
            DetectOutcome::Applied(_)
        ));
        drop(app);

        // A fresh process restores the session and the displayed mood.
        let app = app_with(cache.clone(), None);
        let session = app.start().await.unwrap().unwrap();
        assert!(session.is_guest());
        assert_eq!(app.display().await.mood, Some(CanonicalMood::Joy));

        assert_eq!(app.save_current().await.unwrap(), SaveOutcome::Saved { index: 0 });
        assert_eq!(app.save_current().await.unwrap(), SaveOutcome::AlreadySaved);
        assert!(cache.get(SAVED_THEMES_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_before_detect_is_rejected() {
        let app = app_with(Arc::new(MemoryKeyValueCache::new()), None);
        app.sign_in(SignInMethod::Anonymous).await.unwrap();

        let err = app.save_current().await.unwrap_err();
        assert_eq!(err.as_notice(), Some(Notice::DetectMoodFirst));
        assert!(app.saved().await.is_empty());
    }

    #[tokio::test]
    async fn test_apply_saved_then_save_reports_already_saved() {
        let app = app_with(Arc::new(MemoryKeyValueCache::new()), None);
        app.sign_in(SignInMethod::Anonymous).await.unwrap();
        app.detect_text("rain again").await.unwrap();
        app.save_current().await.unwrap();
        app.reset().await.unwrap();

        let state = app.apply_saved(0).await.unwrap().unwrap();
        assert_eq!(state.mood, Some(CanonicalMood::Sadness));
        assert_eq!(app.save_current().await.unwrap(), SaveOutcome::AlreadySaved);
        assert_eq!(app.apply_saved(5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_out_clears_local_cache() {
        let cache = Arc::new(MemoryKeyValueCache::new());
        let records = Arc::new(RecordingStore::default());
        let app = app_with(cache.clone(), Some(records.clone()));
        let session = app.sign_in(SignInMethod::Anonymous).await.unwrap();
        app.detect_text("sunny").await.unwrap();
        app.save_current().await.unwrap();

        app.sign_out().await.unwrap();

        assert!(app.whoami().await.is_none());
        assert!(app.saved().await.is_empty());
        assert_eq!(app.display().await, DisplayState::default());
        assert!(cache.get(SAVED_THEMES_KEY).unwrap().is_none());
        assert!(cache.get(CURRENT_MOOD_KEY).unwrap().is_none());
        assert_eq!(
            records.saved_moods(session.key.as_str()),
            Some(vec![CanonicalMood::Joy])
        );
    }

    #[tokio::test]
    async fn test_switching_identity_starts_with_empty_sequence() {
        let cache = Arc::new(MemoryKeyValueCache::new());
        let records = Arc::new(RecordingStore::default());
        let app = app_with(cache.clone(), Some(records.clone()));

        let first = app.sign_in(SignInMethod::Anonymous).await.unwrap();
        app.detect_text("sunny").await.unwrap();
        app.save_current().await.unwrap();

        let second = app.sign_in(SignInMethod::Anonymous).await.unwrap();
        assert_ne!(first.key, second.key);
        assert!(app.saved().await.is_empty());
        assert_eq!(app.display().await, DisplayState::default());
        assert!(cache.get(SAVED_THEMES_KEY).unwrap().is_none());

        app.detect_text("rain").await.unwrap();
        assert_eq!(app.save_current().await.unwrap(), SaveOutcome::Saved { index: 0 });
        app.flush().await;

        assert_eq!(
            records.saved_moods(second.key.as_str()),
            Some(vec![CanonicalMood::Sadness])
        );
        assert_eq!(
            records.saved_moods(first.key.as_str()),
            Some(vec![CanonicalMood::Joy])
        );
    }

    #[tokio::test]
    async fn test_export_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("saved_themes.json");
        let app = app_with(Arc::new(MemoryKeyValueCache::new()), None);
        app.sign_in(SignInMethod::Anonymous).await.unwrap();

        let err = app.export_saved(&path).await.unwrap_err();
        assert_eq!(err.as_notice(), Some(Notice::NothingToExport));

        app.detect_text("sunny").await.unwrap();
        app.save_current().await.unwrap();
        app.export_saved(&path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed = SavedThemes::from_export_json(&written).unwrap();
        assert_eq!(parsed, app.saved().await);
        assert!(written.contains('\n'));
    }

    #[tokio::test]
    async fn test_camera_disabled_is_unavailable() {
        let app = app_with(Arc::new(MemoryKeyValueCache::new()), None);
        app.sign_in(SignInMethod::Anonymous).await.unwrap();

        let err = app.start_camera().await.unwrap_err();
        assert_eq!(err.as_notice(), Some(Notice::CameraUnavailable));
        assert!(app.spawn_camera_sampler(Some(1), None).is_err());
    }
}
