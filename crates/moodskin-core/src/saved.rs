//! Saved-themes sequence.
//!
//! The user's curated, order-preserving list of mood → theme bindings.
//! Invariant: at most one entry per [`CanonicalMood`].

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mood::CanonicalMood;
use crate::theme::Theme;

/// Default file name for an exported sequence.
pub const EXPORT_FILE_NAME: &str = "saved_themes.json";

/// A mood paired with a copy of its theme at save time.
///
/// Serialized flat: `{"mood": ..., "gradient": ..., "description": ..., "button": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedThemeEntry {
    pub mood: CanonicalMood,
    #[serde(flatten)]
    pub theme: Theme,
}

impl SavedThemeEntry {
    pub fn new(mood: CanonicalMood, theme: Theme) -> Self {
        Self { mood, theme }
    }

    /// Pure selector: the mood and theme to re-render with.
    pub fn apply(&self) -> (CanonicalMood, Theme) {
        (self.mood, self.theme.clone())
    }
}

/// Outcome of a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Appended at `index`.
    Saved { index: usize },
    /// The mood was already present; nothing changed.
    AlreadySaved,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

/// Ordered, deduplicated sequence of [`SavedThemeEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SavedThemes {
    entries: Vec<SavedThemeEntry>,
}

impl<'de> Deserialize<'de> for SavedThemes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = Vec::<SavedThemeEntry>::deserialize(deserializer)?;
        Ok(Self::from_entries(entries))
    }
}

impl SavedThemes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sequence from untrusted entries (cache, remote, import).
    ///
    /// Keeps the first entry for each mood and drops entries with an invalid gradient.
    pub fn from_entries(entries: Vec<SavedThemeEntry>) -> Self {
        let mut kept: Vec<SavedThemeEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.theme.gradient.is_valid() {
                tracing::warn!(mood = %entry.mood, "Dropping saved theme with invalid gradient");
                continue;
            }
            if kept.iter().any(|existing| existing.mood == entry.mood) {
                tracing::warn!(mood = %entry.mood, "Dropping duplicate saved theme");
                continue;
            }
            kept.push(entry);
        }
        Self { entries: kept }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SavedThemeEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&SavedThemeEntry> {
        self.entries.get(index)
    }

    pub fn contains(&self, mood: CanonicalMood) -> bool {
        self.entries.iter().any(|entry| entry.mood == mood)
    }

    /// Appends `mood` with a copy of `theme` unless the mood is already present.
    pub fn save(&mut self, mood: CanonicalMood, theme: &Theme) -> SaveOutcome {
        if self.contains(mood) {
            return SaveOutcome::AlreadySaved;
        }
        self.entries.push(SavedThemeEntry::new(mood, theme.clone()));
        SaveOutcome::Saved {
            index: self.entries.len() - 1,
        }
    }

    /// Removes the entry at `index`; later entries shift down. Out of bounds is `None`.
    pub fn remove(&mut self, index: usize) -> Option<SavedThemeEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Pretty-printed JSON array of entries.
    pub fn to_export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Parses an exported JSON array.
    pub fn from_export_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_entries(self) -> Vec<SavedThemeEntry> {
        self.entries
    }
}
