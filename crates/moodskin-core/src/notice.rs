//! User-facing notices.
//!
//! A notice is what a front end shows when an operation is aborted or turns
//! out to be a no-op. Notices never represent a fatal condition.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-fatal, user-visible outcome of an aborted or no-op operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Notice {
    /// Save was requested before any mood was resolved.
    DetectMoodFirst,
    /// The mood is already in the saved sequence.
    AlreadySaved,
    /// Detection was requested with blank input text.
    EmptyInput,
    /// A camera sample was requested while the camera is off.
    CameraInactive,
    /// The camera could not be acquired (missing device, permission denied).
    CameraUnavailable,
    /// The inference provider failed (network, timeout, provider error).
    InferenceFailed,
    /// The provider answered but no mood could be derived from it.
    MoodNotDetected,
    /// Export was requested on an empty saved sequence.
    NothingToExport,
    /// The operation needs a registered or guest session.
    SignInRequired,
    /// The local cache could not be written.
    StorageFailed,
}

impl Notice {
    /// Message shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            Notice::DetectMoodFirst => "Detect mood first!",
            Notice::AlreadySaved => "Already saved!",
            Notice::EmptyInput => "Type or speak your mood first.",
            Notice::CameraInactive => "Turn on the camera first.",
            Notice::CameraUnavailable => "Camera is unavailable or permission was denied.",
            Notice::InferenceFailed => "Error detecting mood. Try again!",
            Notice::MoodNotDetected => "Could not detect mood. Try again!",
            Notice::NothingToExport => "Nothing to export.",
            Notice::SignInRequired => "Sign in or continue as a guest first.",
            Notice::StorageFailed => "Could not store your saved themes on this device.",
        }
    }

    /// Informational notices describe a no-op rather than a failure.
    pub fn is_informational(&self) -> bool {
        matches!(self, Notice::AlreadySaved | Notice::NothingToExport)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_message() {
        assert_eq!(Notice::AlreadySaved.to_string(), "Already saved!");
        assert_eq!(Notice::DetectMoodFirst.to_string(), "Detect mood first!");
    }

    #[test]
    fn test_informational() {
        assert!(Notice::AlreadySaved.is_informational());
        assert!(!Notice::InferenceFailed.is_informational());
    }
}
