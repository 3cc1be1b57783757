//! Theme domain module.
//!
//! - `model`: [`Theme`], [`Gradient`], [`ButtonPalette`]
//! - `catalog`: the static mood → theme table and the default theme

mod catalog;
mod model;

pub use catalog::{catalog, default_theme, theme_for};
pub use model::{ButtonPalette, Gradient, GradientShape, Theme};
