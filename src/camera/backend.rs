use anyhow::Result;
use tokio::sync::mpsc;

use crate::config::CameraProfile;

/// A single captured video frame, already JPEG-encoded by the backend.
///
/// The capture pipeline treats the payload as opaque bytes; quality and
/// resolution negotiation happen inside the backend against the profile.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// JPEG-encoded image data
    pub jpeg: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Camera capture backend trait
///
/// Platform-specific implementations:
/// - macOS: AVFoundation via Swift FFI bridge
/// - Synthetic: deterministic test pattern (tests, headless development)
#[async_trait::async_trait]
pub trait CameraBackend: Send + Sync {
    /// Request the device and start capturing.
    ///
    /// Returns a channel receiver that will receive encoded frames. An error
    /// here means the device was denied or unavailable; the caller treats it
    /// as a recoverable "camera off" condition, not a fatal one.
    async fn start(&mut self) -> Result<mpsc::Receiver<VideoFrame>>;

    /// Release the device. Must be safe to call when capture never started.
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Camera source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSource {
    /// Physical camera device (macOS AVFoundation only)
    Device,
    /// Generated test pattern (all platforms)
    Synthetic,
}

/// Camera backend factory
pub struct CameraFactory;

impl CameraFactory {
    /// Create a camera backend based on platform and configuration
    pub fn create(source: CameraSource, profile: CameraProfile) -> Result<Box<dyn CameraBackend>> {
        match source {
            CameraSource::Device => {
                #[cfg(target_os = "macos")]
                {
                    use super::macos::DeviceCamera;
                    let backend = DeviceCamera::new(profile)?;
                    Ok(Box::new(backend))
                }

                #[cfg(not(target_os = "macos"))]
                {
                    let _ = profile;
                    anyhow::bail!("camera device capture is only supported on macOS")
                }
            }

            CameraSource::Synthetic => {
                let backend = super::synthetic::SyntheticCamera::new(profile);
                Ok(Box::new(backend))
            }
        }
    }
}
