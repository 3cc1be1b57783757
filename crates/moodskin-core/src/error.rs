//! Error types for moodskin.

use thiserror::Error;

use crate::notice::Notice;

/// Error type shared by every moodskin crate.
///
/// No variant is fatal: each one degrades to a [`Notice`] through
/// [`MoodskinError::user_notice`].
#[derive(Error, Debug, Clone)]
pub enum MoodskinError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Text or facial inference provider error
    #[error("Inference error: {0}")]
    Inference(String),

    /// Remote document store error
    #[error("Remote store error: {0}")]
    Remote(String),

    /// Identity provider error
    #[error("Identity error: {0}")]
    Identity(String),

    /// Camera acquisition or capture error
    #[error("Camera error: {0}")]
    Camera(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Aborted operation that only needs a user-facing notice
    #[error("{0}")]
    Notice(Notice),
}

impl MoodskinError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity(message.into())
    }

    pub fn camera(message: impl Into<String>) -> Self {
        Self::Camera(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Returns the wrapped notice, if this error is a plain notice.
    pub fn as_notice(&self) -> Option<Notice> {
        match self {
            Self::Notice(notice) => Some(*notice),
            _ => None,
        }
    }

    /// Maps any error to the notice a front end should show.
    pub fn user_notice(&self) -> Notice {
        match self {
            Self::Notice(notice) => *notice,
            Self::Inference(_) => Notice::InferenceFailed,
            Self::Camera(_) => Notice::CameraUnavailable,
            Self::Io { .. } | Self::Serialization { .. } => Notice::StorageFailed,
            Self::Identity(_) => Notice::SignInRequired,
            Self::NotFound { .. }
            | Self::Config(_)
            | Self::Remote(_)
            | Self::Internal(_) => Notice::InferenceFailed,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<Notice> for MoodskinError {
    fn from(notice: Notice) -> Self {
        Self::Notice(notice)
    }
}

impl From<std::io::Error> for MoodskinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MoodskinError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MoodskinError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MoodskinError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, MoodskinError>`.
pub type Result<T> = std::result::Result<T, MoodskinError>;
