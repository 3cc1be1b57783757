//! Mood inference collaborator traits.
//!
//! Inference back ends are external services; the core only sees their
//! results as raw labels and scores.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::camera::Frame;
use crate::error::Result;

/// One candidate label with a confidence score (higher = more confident).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Response of a text classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum TextInference {
    /// One score per candidate emotion, in provider order.
    Scores(Vec<LabelScore>),
    /// A single best label (generative prompt variant).
    Label(String),
}

/// Result of analyzing one camera frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FacialSample {
    /// No face was detected in the frame.
    NoFace,
    /// Expression name → probability, in provider order.
    Expressions(Vec<LabelScore>),
}

/// Classifies free-form text.
#[async_trait]
pub trait TextMoodInference: Send + Sync {
    /// Short provider name for logs.
    fn provider(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<TextInference>;
}

/// Classifies the facial expression in a frame.
#[async_trait]
pub trait FacialMoodInference: Send + Sync {
    fn provider(&self) -> &str;

    async fn analyze(&self, frame: &Frame) -> Result<FacialSample>;
}
