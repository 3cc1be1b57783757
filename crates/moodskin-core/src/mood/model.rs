//! CanonicalMood domain model.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// One of the eight emotion categories the system recognizes natively.
///
/// Declaration order is the canonical display order (catalog listing).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CanonicalMood {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Love,
    Neutral,
    Disgust,
}

impl CanonicalMood {
    /// Emoji shown next to the mood name.
    pub fn emoji(&self) -> &'static str {
        match self {
            CanonicalMood::Joy => "😄",
            CanonicalMood::Sadness => "😢",
            CanonicalMood::Anger => "😡",
            CanonicalMood::Fear => "😨",
            CanonicalMood::Surprise => "😲",
            CanonicalMood::Love => "❤",
            CanonicalMood::Neutral => "😐",
            CanonicalMood::Disgust => "🤢",
        }
    }

    /// Capitalized name for headings ("Joy", "Sadness", ...).
    pub fn title(&self) -> &'static str {
        match self {
            CanonicalMood::Joy => "Joy",
            CanonicalMood::Sadness => "Sadness",
            CanonicalMood::Anger => "Anger",
            CanonicalMood::Fear => "Fear",
            CanonicalMood::Surprise => "Surprise",
            CanonicalMood::Love => "Love",
            CanonicalMood::Neutral => "Neutral",
            CanonicalMood::Disgust => "Disgust",
        }
    }
}
