pub mod frame;
pub mod video;

// Re-export commonly used types
pub use frame::Snapshot;
pub use video::{Camera, FrameSource};
