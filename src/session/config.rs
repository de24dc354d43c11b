use std::time::Duration;

use crate::camera::CameraSource;
use crate::config::{CameraProfile, Config};

/// Configuration for a capture session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "match-1f0c...")
    pub session_id: String,

    /// Which camera backend to request
    pub camera_source: CameraSource,

    /// Capture profile handed to the camera backend
    pub camera: CameraProfile,

    /// Capture-loop period; a frame is sampled and published each tick
    pub frame_interval: Duration,

    /// Detections below this confidence are ignored entirely
    pub confidence_threshold: f32,

    /// Minimum gap between accepted detections, global across categories
    pub debounce: Duration,
}

impl SessionConfig {
    /// Build a session config from the loaded service configuration,
    /// generating a fresh session id.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            session_id: format!("match-{}", uuid::Uuid::new_v4()),
            camera_source: CameraSource::Device,
            camera: cfg.camera.clone(),
            frame_interval: Duration::from_millis(cfg.inference.frame_interval_ms),
            confidence_threshold: cfg.inference.confidence_threshold,
            debounce: Duration::from_millis(cfg.inference.debounce_ms),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("match-{}", uuid::Uuid::new_v4()),
            camera_source: CameraSource::Device,
            camera: CameraProfile {
                ideal_width: 640,
                ideal_height: 480,
                ideal_frame_rate: 30,
                min_width: 320,
                min_height: 240,
                min_frame_rate: 10,
                jpeg_quality: 70,
            },
            frame_interval: Duration::from_millis(100),
            confidence_threshold: 0.5,
            debounce: Duration::from_millis(500),
        }
    }
}
