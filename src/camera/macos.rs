// macOS camera backend using AVFoundation via Swift FFI bridge
//
// Platform: macOS 12.0+ only. The bridge (bridge.swift) owns the
// AVCaptureSession and delivers JPEG-encoded frames through a C callback.

use anyhow::{bail, Result};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{error, info};

use super::backend::{CameraBackend, VideoFrame};
use crate::config::CameraProfile;

// MARK: - FFI declarations

#[link(name = "brawlr_camera", kind = "static")]
extern "C" {
    fn brawlr_camera_is_available() -> bool;

    fn brawlr_camera_start(
        width: u32,
        height: u32,
        frame_rate: u32,
        jpeg_quality: u8,
        callback: extern "C" fn(*const u8, i32, u32, u32),
    ) -> i32;

    fn brawlr_camera_stop() -> i32;
}

/// Check whether a capture device is present and authorized
pub fn is_available() -> bool {
    unsafe { brawlr_camera_is_available() }
}

/// Physical camera backend
pub struct DeviceCamera {
    profile: CameraProfile,
    capturing: bool,
}

impl DeviceCamera {
    pub fn new(profile: CameraProfile) -> Result<Self> {
        if !is_available() {
            bail!("no camera device available or capture permission denied");
        }

        info!(
            "Device camera initialized ({}x{} @ {}fps requested)",
            profile.ideal_width, profile.ideal_height, profile.ideal_frame_rate
        );

        Ok(Self {
            profile,
            capturing: false,
        })
    }
}

#[async_trait::async_trait]
impl CameraBackend for DeviceCamera {
    async fn start(&mut self) -> Result<mpsc::Receiver<VideoFrame>> {
        if self.capturing {
            bail!("Already capturing");
        }

        info!("Starting AVFoundation camera capture");

        let (tx, rx) = mpsc::channel(16);

        let now_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let tx_ptr = Box::into_raw(Box::new(tx));
        let start_ptr = Arc::into_raw(Arc::new(Mutex::new(now_ms)));

        unsafe {
            GLOBAL_FRAME_TX = tx_ptr;
            GLOBAL_START_TIME = start_ptr as *mut _;
        }

        let result = unsafe {
            brawlr_camera_start(
                self.profile.ideal_width,
                self.profile.ideal_height,
                self.profile.ideal_frame_rate,
                self.profile.jpeg_quality,
                frame_callback,
            )
        };

        if result != 0 {
            unsafe { release_globals() };
            bail!("Failed to start camera capture (error code: {})", result);
        }

        self.capturing = true;
        info!("Camera capture started successfully");

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if !self.capturing {
            return Ok(());
        }

        info!("Stopping camera capture");

        let result = unsafe { brawlr_camera_stop() };
        unsafe { release_globals() };
        self.capturing = false;

        if result != 0 {
            bail!("Failed to stop camera capture (error code: {})", result);
        }

        info!("Camera capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "macOS AVFoundation"
    }
}

// MARK: - Frame callback

static mut GLOBAL_FRAME_TX: *mut mpsc::Sender<VideoFrame> = std::ptr::null_mut();
static mut GLOBAL_START_TIME: *mut Mutex<u64> = std::ptr::null_mut();

unsafe fn release_globals() {
    if !GLOBAL_FRAME_TX.is_null() {
        let _ = Box::from_raw(GLOBAL_FRAME_TX);
        GLOBAL_FRAME_TX = std::ptr::null_mut();
    }
    if !GLOBAL_START_TIME.is_null() {
        let _ = Arc::from_raw(GLOBAL_START_TIME as *const Mutex<u64>);
        GLOBAL_START_TIME = std::ptr::null_mut();
    }
}

extern "C" fn frame_callback(jpeg_ptr: *const u8, jpeg_len: i32, width: u32, height: u32) {
    if jpeg_ptr.is_null() || jpeg_len <= 0 {
        return;
    }

    unsafe {
        if GLOBAL_FRAME_TX.is_null() {
            error!("Frame callback called but sender is null");
            return;
        }

        let tx = &*GLOBAL_FRAME_TX;

        let start_ms = if GLOBAL_START_TIME.is_null() {
            0
        } else {
            *(*GLOBAL_START_TIME).lock().unwrap()
        };

        let now_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let frame = VideoFrame {
            jpeg: std::slice::from_raw_parts(jpeg_ptr, jpeg_len as usize).to_vec(),
            width,
            height,
            timestamp_ms: now_ms.saturating_sub(start_ms),
        };

        // Non-blocking: a stalled consumer drops frames rather than the
        // capture thread
        if let Err(e) = tx.try_send(frame) {
            error!("Failed to send video frame: {}", e);
        }
    }
}
