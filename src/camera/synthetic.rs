use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::backend::{CameraBackend, VideoFrame};
use crate::config::CameraProfile;

/// JPEG start-of-image + JFIF APP0 header. The synthetic payload only has to
/// look like an encoded frame to the transport; nothing downstream decodes it.
const JFIF_HEADER: [u8; 20] = [
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00,
];

const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// Deterministic test-pattern camera.
///
/// Emits stub JPEG frames at the profile's ideal frame rate. Used by tests
/// and for headless development without a physical device.
pub struct SyntheticCamera {
    profile: CameraProfile,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl SyntheticCamera {
    pub fn new(profile: CameraProfile) -> Self {
        Self {
            profile,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    fn frame_bytes(index: u64) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(JFIF_HEADER.len() + 64 + JPEG_EOI.len());
        bytes.extend_from_slice(&JFIF_HEADER);
        for i in 0..64u64 {
            bytes.push(((index.wrapping_add(i)) % 251) as u8);
        }
        bytes.extend_from_slice(&JPEG_EOI);
        bytes
    }
}

#[async_trait::async_trait]
impl CameraBackend for SyntheticCamera {
    async fn start(&mut self) -> Result<mpsc::Receiver<VideoFrame>> {
        let (tx, rx) = mpsc::channel(16);

        let fps = self.profile.ideal_frame_rate.max(1);
        let width = self.profile.ideal_width;
        let height = self.profile.ideal_height;
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);

        info!("Starting synthetic camera ({}x{} @ {}fps)", width, height, fps);

        let task = tokio::spawn(async move {
            let period = Duration::from_millis(1_000 / fps as u64);
            let mut interval = tokio::time::interval(period);
            let mut index: u64 = 0;

            loop {
                interval.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let frame = VideoFrame {
                    jpeg: Self::frame_bytes(index),
                    width,
                    height,
                    timestamp_ms: index * period.as_millis() as u64,
                };
                index += 1;

                // Receiver gone means the session released us
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        });

        self.task = Some(task);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            let _ = task.await;
            info!("Synthetic camera stopped");
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
