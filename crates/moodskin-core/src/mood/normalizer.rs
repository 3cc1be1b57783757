//! Label normalization map.
//!
//! Collapses the vocabularies of every supported classifier (emotion model
//! labels, facial-expression names, generative prompt words) into
//! [`CanonicalMood`].

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::model::CanonicalMood;

static LABEL_MAP: Lazy<HashMap<&'static str, CanonicalMood>> = Lazy::new(|| {
    use CanonicalMood::*;
    HashMap::from([
        // canonical names
        ("joy", Joy),
        ("sadness", Sadness),
        ("anger", Anger),
        ("fear", Fear),
        ("surprise", Surprise),
        ("love", Love),
        ("neutral", Neutral),
        ("disgust", Disgust),
        // facial expression vocabulary
        ("happy", Joy),
        ("sad", Sadness),
        ("angry", Anger),
        ("fearful", Fear),
        ("surprised", Surprise),
        ("disgusted", Disgust),
        // love synonyms
        ("affection", Love),
        ("romantic", Love),
        ("heart", Love),
        ("crush", Love),
        // generative prompt vocabulary
        ("calm", Neutral),
        ("excited", Joy),
    ])
});

/// Cleans a raw label: trims surrounding punctuation and whitespace, lower-cases.
pub fn clean_label(raw: &str) -> String {
    raw.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Looks up an already-cleaned label.
pub fn lookup(label: &str) -> Option<CanonicalMood> {
    LABEL_MAP.get(label).copied()
}

/// Every raw label the map knows about.
pub fn known_labels() -> impl Iterator<Item = (&'static str, CanonicalMood)> {
    LABEL_MAP.iter().map(|(label, mood)| (*label, *mood))
}
