pub mod account;
pub mod camera;
pub mod context;
pub mod mood;
pub mod render;
pub mod saved;
