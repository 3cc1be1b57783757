//! Mood session: the displayed mood and theme, and request fencing.
//!
//! Every detection takes a ticket from a monotonically increasing counter
//! when it is issued. Its result is applied only if no newer ticket has been
//! issued in the meantime; otherwise it is reported as superseded. Explicit
//! actions (reset, applying a saved theme, a camera sample) take a ticket at
//! apply time, so they also invalidate in-flight text detections.

use moodskin_core::CanonicalMood;
use moodskin_core::error::Result;
use moodskin_core::inference::TextMoodInference;
use moodskin_core::mood::{MoodResolver, Resolution};
use moodskin_core::notice::Notice;
use moodskin_core::saved::SavedThemeEntry;
use moodskin_core::theme::{Theme, theme_for};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// What is currently rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    /// `None` before the first detection, after reset, or for unmapped labels.
    pub mood: Option<CanonicalMood>,
    pub theme: Theme,
}

impl DisplayState {
    pub fn for_mood(mood: Option<CanonicalMood>) -> Self {
        Self {
            mood,
            theme: theme_for(mood).clone(),
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::for_mood(None)
    }
}

/// Outcome of a text detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectOutcome {
    Applied(DisplayState),
    /// A newer request was issued while this one was in flight; its result was discarded.
    Superseded,
}

pub struct MoodSession {
    resolver: MoodResolver,
    text: Arc<dyn TextMoodInference>,
    state: RwLock<DisplayState>,
    latest_ticket: AtomicU64,
}

impl MoodSession {
    pub fn new(resolver: MoodResolver, text: Arc<dyn TextMoodInference>) -> Self {
        Self {
            resolver,
            text,
            state: RwLock::new(DisplayState::default()),
            latest_ticket: AtomicU64::new(0),
        }
    }

    pub fn resolver(&self) -> &MoodResolver {
        &self.resolver
    }

    pub async fn current(&self) -> DisplayState {
        self.state.read().await.clone()
    }

    fn issue_ticket(&self) -> u64 {
        self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest_ticket.load(Ordering::SeqCst) == ticket
    }

    /// Infers a mood from `text` and re-renders with it.
    ///
    /// Love trigger words short-circuit to `love` without calling the classifier.
    pub async fn detect_from_text(&self, text: &str) -> Result<DetectOutcome> {
        if text.trim().is_empty() {
            return Err(Notice::EmptyInput.into());
        }

        let ticket = self.issue_ticket();

        let resolution = if self.resolver.love_override(text) {
            tracing::debug!(ticket, "Love trigger matched; skipping classifier");
            Resolution::Mood(CanonicalMood::Love)
        } else {
            match self.text.classify(text).await {
                Ok(response) => self.resolver.resolve_text_response(&response),
                Err(e) if !self.is_latest(ticket) => {
                    tracing::debug!(ticket, error = %e, "Ignoring failure of superseded detection");
                    return Ok(DetectOutcome::Superseded);
                }
                Err(e) => {
                    tracing::warn!(provider = self.text.provider(), error = %e, "Text inference failed");
                    return Err(e);
                }
            }
        };

        let mut state = self.state.write().await;
        if !self.is_latest(ticket) {
            tracing::debug!(ticket, "Discarding superseded detection");
            return Ok(DetectOutcome::Superseded);
        }

        let mood = match resolution {
            Resolution::Mood(mood) => Some(mood),
            Resolution::Unmapped(label) => {
                tracing::info!(label = %label, "Unmapped label; showing default theme");
                None
            }
            Resolution::NoSignal => return Err(Notice::MoodNotDetected.into()),
        };

        *state = DisplayState::for_mood(mood);
        tracing::info!(mood = ?mood, "Applied detected mood");
        Ok(DetectOutcome::Applied(state.clone()))
    }

    /// Applies a resolution produced elsewhere (camera samples).
    ///
    /// `NoSignal` leaves the display unchanged and returns `None`.
    pub async fn apply_resolution(&self, resolution: &Resolution) -> Option<DisplayState> {
        if resolution.is_no_signal() {
            return None;
        }
        Some(self.set_mood(resolution.mood()).await)
    }

    /// Re-renders with `mood` (a restored mood, a camera sample, or `None`).
    pub async fn set_mood(&self, mood: Option<CanonicalMood>) -> DisplayState {
        self.show(DisplayState::for_mood(mood)).await
    }

    /// Re-renders with a saved entry's mood and the theme it was saved with.
    pub async fn apply_saved(&self, entry: &SavedThemeEntry) -> DisplayState {
        let (mood, theme) = entry.apply();
        self.show(DisplayState {
            mood: Some(mood),
            theme,
        })
        .await
    }

    async fn show(&self, next: DisplayState) -> DisplayState {
        let mut state = self.state.write().await;
        self.issue_ticket();
        *state = next;
        state.clone()
    }

    /// Back to the welcome theme.
    pub async fn reset(&self) -> DisplayState {
        self.set_mood(None).await
    }
}
