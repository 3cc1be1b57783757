//! Application layer for moodskin.
//!
//! Use cases that coordinate the domain collaborators: the mood session with
//! request fencing, the theme store and its remote mirror, the camera
//! controller, and the [`MoodskinApp`] facade used by front ends.

pub mod app;
pub mod camera;
pub mod mirror;
pub mod mood_session;
pub mod theme_store;

pub use app::{AppComponents, MoodskinApp};
pub use camera::{CameraController, CameraSampler, SampleEvent, SampleOutcome};
pub use mirror::RemoteMirror;
pub use mood_session::{DetectOutcome, DisplayState, MoodSession};
pub use theme_store::ThemeStore;
