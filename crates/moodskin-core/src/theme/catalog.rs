//! Static mood → theme table.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::IntoEnumIterator;

use super::model::{ButtonPalette, Gradient, Theme};
use crate::mood::CanonicalMood;

const ANGLE: u16 = 135;

fn theme(stops: [&str; 2], description: &str, button: [&str; 3]) -> Theme {
    Theme {
        gradient: Gradient::linear(ANGLE, stops),
        description: description.to_string(),
        button: ButtonPalette::new(button[0], button[1], button[2]),
    }
}

static THEMES: Lazy<HashMap<CanonicalMood, Theme>> = Lazy::new(|| {
    use CanonicalMood::*;
    HashMap::from([
        (
            Joy,
            theme(
                ["#f9d423", "#ff4e50"],
                "Bright and cheerful!",
                ["#ffcc00", "#ffb300", "#000"],
            ),
        ),
        (
            Sadness,
            theme(
                ["#bdc3c7", "#2c3e50"],
                "Calm, introspective, and quietly emotional.",
                ["#a9b0b8", "#8f98a1", "#000"],
            ),
        ),
        (
            Anger,
            theme(
                ["#ff416c", "#ff4b2b"],
                "Intense and passionate.",
                ["#ff5c5c", "#ff3030", "#fff"],
            ),
        ),
        (
            Fear,
            theme(
                ["#8360c3", "#2ebf91"],
                "Cautious and alert.",
                ["#5cd6b0", "#4bb497", "#000"],
            ),
        ),
        (
            Surprise,
            theme(
                ["#ff9a9e", "#fad0c4"],
                "Curious and amazed.",
                ["#ffb6c1", "#ffa6b5", "#000"],
            ),
        ),
        (
            Love,
            theme(
                ["#ff758c", "#ff7eb3"],
                "Warm and affectionate.",
                ["#ff9eb5", "#ff86a0", "#000"],
            ),
        ),
        (
            Neutral,
            theme(
                ["#89f7fe", "#66a6ff"],
                "Balanced and steady.",
                ["#a0e1ff", "#8dd4ff", "#000"],
            ),
        ),
        (
            Disgust,
            theme(
                ["#76b852", "#8DC26F"],
                "Repulsed but aware, facing what feels unpleasant.",
                ["#8cc46e", "#79b25d", "#000"],
            ),
        ),
    ])
});

static DEFAULT_THEME: Lazy<Theme> = Lazy::new(|| {
    theme(
        ["#667eea", "#764ba2"],
        "Welcome to moodskin. Discover your emotional vibe.",
        ["#fff", "#e0e0e0", "#000"],
    )
});

/// The welcome theme, shown before the first detection and after a reset.
pub fn default_theme() -> &'static Theme {
    &DEFAULT_THEME
}

/// Theme for a mood; "no mood" gets the default theme.
pub fn theme_for(mood: Option<CanonicalMood>) -> &'static Theme {
    mood.and_then(|m| THEMES.get(&m))
        .unwrap_or_else(default_theme)
}

/// All mood themes in canonical order.
pub fn catalog() -> Vec<(CanonicalMood, &'static Theme)> {
    CanonicalMood::iter()
        .map(|mood| (mood, theme_for(Some(mood))))
        .collect()
}
