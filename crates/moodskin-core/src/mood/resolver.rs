//! Mood Resolver.
//!
//! Converts heterogeneous raw emotion signals into one [`CanonicalMood`].
//! Precedence for text input is fixed:
//!
//! 1. a love trigger word in the raw text forces `love` (the classifier is not consulted),
//! 2. the classifier's best label through the normalization map,
//! 3. the configured [`FallbackPolicy`] for labels the map does not know.

use serde::{Deserialize, Serialize};

use super::model::CanonicalMood;
use super::normalizer;
use crate::config::{FallbackPolicy, ResolverSettings};
use crate::inference::{FacialSample, LabelScore, TextInference};

/// Result of resolving one raw signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Resolution {
    /// A canonical mood was resolved.
    Mood(CanonicalMood),
    /// The label was not recognized and the policy leaves the mood unset
    /// (the default theme is shown).
    Unmapped(String),
    /// There was nothing to resolve (no face in frame, empty score list).
    NoSignal,
}

impl Resolution {
    /// The resolved mood, if any.
    pub fn mood(&self) -> Option<CanonicalMood> {
        match self {
            Resolution::Mood(mood) => Some(*mood),
            _ => None,
        }
    }

    pub fn is_no_signal(&self) -> bool {
        matches!(self, Resolution::NoSignal)
    }
}

/// Pure resolver configured once at startup.
#[derive(Debug, Clone)]
pub struct MoodResolver {
    fallback: FallbackPolicy,
    love_triggers: Vec<String>,
}

impl Default for MoodResolver {
    fn default() -> Self {
        Self::new(&ResolverSettings::default())
    }
}

impl MoodResolver {
    pub fn new(settings: &ResolverSettings) -> Self {
        let love_triggers = settings
            .love_triggers
            .iter()
            .map(|word| word.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        Self {
            fallback: settings.fallback,
            love_triggers,
        }
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Returns true when the raw input text contains any love trigger word.
    pub fn love_override(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.love_triggers
            .iter()
            .any(|trigger| lowered.contains(trigger.as_str()))
    }

    /// Resolves a single raw label through the normalization map and fallback policy.
    pub fn resolve_label(&self, raw: &str) -> Resolution {
        let label = normalizer::clean_label(raw);
        if label.is_empty() {
            return Resolution::NoSignal;
        }

        match normalizer::lookup(&label) {
            Some(mood) => Resolution::Mood(mood),
            None => {
                tracing::debug!(label = %label, policy = ?self.fallback, "Unrecognized mood label");
                match self.fallback {
                    FallbackPolicy::Neutral => Resolution::Mood(CanonicalMood::Neutral),
                    FallbackPolicy::DefaultTheme => Resolution::Unmapped(label),
                }
            }
        }
    }

    /// Stable arg-max over classifier scores, then label normalization.
    pub fn resolve_from_text_scores(&self, scores: &[LabelScore]) -> Resolution {
        match stable_argmax(scores) {
            Some(best) => self.resolve_label(&best.label),
            None => Resolution::NoSignal,
        }
    }

    /// Resolves any text classifier response shape.
    pub fn resolve_text_response(&self, response: &TextInference) -> Resolution {
        match response {
            TextInference::Scores(scores) => self.resolve_from_text_scores(scores),
            TextInference::Label(label) => self.resolve_label(label),
        }
    }

    /// Stable arg-max over facial expression probabilities.
    ///
    /// `NoFace` stays `NoSignal`; it never becomes `neutral`.
    pub fn resolve_from_facial_expression(&self, sample: &FacialSample) -> Resolution {
        match sample {
            FacialSample::NoFace => Resolution::NoSignal,
            FacialSample::Expressions(expressions) => self.resolve_from_text_scores(expressions),
        }
    }
}

/// Returns the highest-scoring entry; ties go to the first occurrence.
///
/// NaN scores never win.
pub fn stable_argmax(scores: &[LabelScore]) -> Option<&LabelScore> {
    let mut best: Option<&LabelScore> = None;
    for candidate in scores.iter().filter(|s| !s.score.is_nan()) {
        match best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(candidate),
        }
    }
    best
}
