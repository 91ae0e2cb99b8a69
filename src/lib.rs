pub mod api;
pub mod auth;
pub mod cms;
pub mod config;
pub mod flow;
pub mod notify;
pub mod render;

// Re-export capture types for convenience
pub use snapmatch_capture::{frame, video, Camera, FrameSource, Snapshot};
