pub mod camera;
pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod inference;
pub mod mood;
pub mod notice;
pub mod record;
pub mod saved;
pub mod theme;

// Re-export common error type
pub use error::MoodskinError;
pub use mood::CanonicalMood;
pub use notice::Notice;
