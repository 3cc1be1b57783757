//! Theme domain models.

use serde::{Deserialize, Serialize};

/// Gradient geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GradientShape {
    /// Linear gradient at `angle` degrees.
    Linear { angle: u16 },
    Radial,
}

/// Background gradient: two or more color stops plus a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gradient {
    pub shape: GradientShape,
    pub stops: Vec<String>,
}

impl Gradient {
    pub fn linear<I, S>(angle: u16, stops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shape: GradientShape::Linear { angle },
            stops: stops.into_iter().map(Into::into).collect(),
        }
    }

    pub fn radial<I, S>(stops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shape: GradientShape::Radial,
            stops: stops.into_iter().map(Into::into).collect(),
        }
    }

    /// A gradient needs at least two stops.
    pub fn is_valid(&self) -> bool {
        self.stops.len() >= 2 && self.stops.iter().all(|stop| !stop.trim().is_empty())
    }

    /// CSS `background` value.
    pub fn to_css(&self) -> String {
        let stops = self.stops.join(",");
        match self.shape {
            GradientShape::Linear { angle } => format!("linear-gradient({}deg,{})", angle, stops),
            GradientShape::Radial => format!("radial-gradient(circle,{})", stops),
        }
    }
}

/// Button colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonPalette {
    pub bg: String,
    pub hover: String,
    pub text: String,
}

impl ButtonPalette {
    pub fn new(bg: impl Into<String>, hover: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            bg: bg.into(),
            hover: hover.into(),
            text: text.into(),
        }
    }
}

/// Presentation bound to a mood. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub gradient: Gradient,
    pub description: String,
    pub button: ButtonPalette,
}
