//! Camera device that replays image files from a directory.
//!
//! Frames are served in file-name order and wrap around at the end.

use async_trait::async_trait;
use moodskin_core::camera::{CameraDevice, Frame, FrameSource};
use moodskin_core::error::{MoodskinError, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DirectoryCamera {
    dir: PathBuf,
}

impl DirectoryCamera {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn image_mime(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
}

#[async_trait]
impl CameraDevice for DirectoryCamera {
    async fn open(&self) -> Result<Box<dyn FrameSource>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            MoodskinError::camera(format!("cannot open {}: {}", self.dir.display(), e))
        })?;

        let mut frames = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if let Some(mime) = image_mime(&path) {
                frames.push((path, mime));
            }
        }
        frames.sort_by(|a, b| a.0.cmp(&b.0));

        if frames.is_empty() {
            return Err(MoodskinError::camera(format!(
                "no image frames in {}",
                self.dir.display()
            )));
        }

        tracing::debug!(dir = %self.dir.display(), frames = frames.len(), "Opened directory camera");
        Ok(Box::new(DirectoryFrameSource {
            frames,
            next: 0,
            released: false,
        }))
    }
}

struct DirectoryFrameSource {
    frames: Vec<(PathBuf, String)>,
    next: usize,
    released: bool,
}

#[async_trait]
impl FrameSource for DirectoryFrameSource {
    async fn capture(&mut self) -> Result<Frame> {
        if self.released {
            return Err(MoodskinError::camera("stream already released"));
        }

        let (path, mime) = &self.frames[self.next % self.frames.len()];
        self.next = self.next.wrapping_add(1);

        let bytes = tokio::fs::read(path).await?;
        Ok(Frame::new(bytes, mime.clone()))
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            tracing::debug!("Released directory camera");
        }
    }
}
