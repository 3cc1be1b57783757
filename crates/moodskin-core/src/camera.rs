//! Camera collaborator traits.
//!
//! A [`CameraDevice`] hands out an exclusively owned [`FrameSource`]; the
//! source must be released exactly once when sampling ends.

use async_trait::async_trait;

use crate::error::Result;

/// One captured video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub bytes: Vec<u8>,
    /// e.g. "image/jpeg"
    pub mime_type: String,
}

impl Frame {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Something that can be opened to produce frames (a webcam, a directory of images).
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Acquires the device. Fails if it is missing or permission is denied.
    async fn open(&self) -> Result<Box<dyn FrameSource>>;
}

/// An acquired camera stream.
#[async_trait]
pub trait FrameSource: Send {
    async fn capture(&mut self) -> Result<Frame>;

    /// Releases the underlying device. Called once by the owner.
    fn release(&mut self);
}
