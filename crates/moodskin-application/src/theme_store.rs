//! Theme store: the saved-themes sequence with local persistence and an
//! optional remote mirror.
//!
//! Every mutation is written to the local cache before it becomes the
//! in-memory state; a failed cache write leaves memory untouched. Remote
//! writes are queued afterwards and never roll back a local change.

use moodskin_core::CanonicalMood;
use moodskin_core::cache::{KeyValueCache, SAVED_THEMES_KEY};
use moodskin_core::error::Result;
use moodskin_core::identity::UserSession;
use moodskin_core::notice::Notice;
use moodskin_core::saved::{SaveOutcome, SavedThemeEntry, SavedThemes};
use moodskin_core::theme::Theme;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::mirror::RemoteMirror;

#[derive(Default)]
struct StoreState {
    session: Option<UserSession>,
    saved: SavedThemes,
}

pub struct ThemeStore {
    cache: Arc<dyn KeyValueCache>,
    mirror: Option<RemoteMirror>,
    state: Mutex<StoreState>,
}

impl ThemeStore {
    pub fn new(cache: Arc<dyn KeyValueCache>, mirror: Option<RemoteMirror>) -> Self {
        Self {
            cache,
            mirror,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Loads the sequence for `session`: local cache first, then the remote
    /// record, which wins when it exists.
    pub async fn bind_session(&self, session: &UserSession) -> Result<()> {
        let mut state = self.state.lock().await;
        state.session = Some(session.clone());
        state.saved = self.load_local();

        let Some(mirror) = &self.mirror else {
            return Ok(());
        };

        match mirror.hydrate(session).await {
            Ok(Some(remote)) => {
                let remote = SavedThemes::from_entries(remote);
                self.persist_local(&remote)?;
                tracing::info!(count = remote.len(), "Hydrated saved themes from remote record");
                state.saved = remote;
            }
            Ok(None) => {
                tracing::debug!(key = %session.key, "No remote record yet");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote hydration failed; keeping local saved themes");
            }
        }
        Ok(())
    }

    /// Appends the current mood's theme unless that mood is already saved.
    pub async fn save_current(
        &self,
        mood: Option<CanonicalMood>,
        theme: &Theme,
    ) -> Result<SaveOutcome> {
        let mood = mood.ok_or(Notice::DetectMoodFirst)?;

        let mut state = self.state.lock().await;
        let mut next = state.saved.clone();
        let outcome = next.save(mood, theme);
        if outcome == SaveOutcome::AlreadySaved {
            tracing::debug!(mood = %mood, "Mood already saved");
            return Ok(outcome);
        }

        self.commit(&mut state, next)?;
        tracing::info!(mood = %mood, "Saved theme");
        Ok(outcome)
    }

    /// Removes the entry at `index`. Out of bounds only logs.
    pub async fn remove(&self, index: usize) -> Result<Option<SavedThemeEntry>> {
        let mut state = self.state.lock().await;
        let mut next = state.saved.clone();
        let Some(removed) = next.remove(index) else {
            tracing::warn!(index, len = next.len(), "Remove index out of bounds");
            return Ok(None);
        };

        self.commit(&mut state, next)?;
        Ok(Some(removed))
    }

    /// Empties the sequence, deletes the cache key and mirrors an empty sequence.
    pub async fn clear_all(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.cache.remove(SAVED_THEMES_KEY)?;
        state.saved.clear();
        self.mirror_write(&state);
        Ok(())
    }

    /// Forgets the session and the local copy; remote data is untouched.
    pub async fn forget_local(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.session = None;
        state.saved.clear();
        self.cache.remove(SAVED_THEMES_KEY)
    }

    pub async fn get(&self, index: usize) -> Option<SavedThemeEntry> {
        self.state.lock().await.saved.get(index).cloned()
    }

    pub async fn snapshot(&self) -> SavedThemes {
        self.state.lock().await.saved.clone()
    }

    /// Pretty JSON of the sequence; empty is a "nothing to export" notice.
    pub async fn export_json(&self) -> Result<String> {
        let state = self.state.lock().await;
        if state.saved.is_empty() {
            return Err(Notice::NothingToExport.into());
        }
        state.saved.to_export_json()
    }

    /// Waits for queued remote writes.
    pub async fn flush(&self) {
        if let Some(mirror) = &self.mirror {
            mirror.flush().await;
        }
    }

    fn commit(&self, state: &mut StoreState, next: SavedThemes) -> Result<()> {
        self.persist_local(&next)?;
        state.saved = next;
        self.mirror_write(state);
        Ok(())
    }

    fn mirror_write(&self, state: &StoreState) {
        if let (Some(mirror), Some(session)) = (&self.mirror, &state.session) {
            mirror.write(session, state.saved.entries().to_vec());
        }
    }

    fn load_local(&self) -> SavedThemes {
        let raw = match self.cache.get(SAVED_THEMES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SavedThemes::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read cached saved themes");
                return SavedThemes::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring corrupt cached saved themes");
            SavedThemes::new()
        })
    }

    fn persist_local(&self, saved: &SavedThemes) -> Result<()> {
        let json = serde_json::to_string(saved)?;
        self.cache.set(SAVED_THEMES_KEY, &json).map_err(|e| {
            tracing::warn!(error = %e, "Local cache write failed");
            e
        })
    }
}
