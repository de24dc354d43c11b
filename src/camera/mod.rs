pub mod backend;
pub mod synthetic;

#[cfg(target_os = "macos")]
pub mod macos;

pub use backend::{CameraBackend, CameraFactory, CameraSource, VideoFrame};
pub use synthetic::SyntheticCamera;
