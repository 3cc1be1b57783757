//! Mood domain module.
//!
//! - `model`: the closed [`CanonicalMood`] set
//! - `normalizer`: raw label vocabulary → canonical mood
//! - `resolver`: arg-max, love triggers and fallback policy

mod model;
pub mod normalizer;
mod resolver;

pub use model::CanonicalMood;
pub use resolver::{MoodResolver, Resolution, stable_argmax};
