// In-memory doubles for the external collaborators (inference peer,
// leaderboard store), so session and save tests run without a broker.

#![allow(dead_code)]

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

use brawlr_trainer::camera::CameraSource;
use brawlr_trainer::config::CameraProfile;
use brawlr_trainer::inference::{ConnectionState, DetectionMessage, FrameMessage, FrameTransport};
use brawlr_trainer::save::{LeaderboardEntry, ScoreStore};
use brawlr_trainer::session::SessionConfig;

/// In-memory inference link: records published frames, lets tests inject
/// detection events.
pub struct MemoryTransport {
    connected: AtomicBool,
    frames: Mutex<Vec<FrameMessage>>,
    detection_tx: Mutex<Option<mpsc::Sender<DetectionMessage>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            frames: Mutex::new(Vec::new()),
            detection_tx: Mutex::new(None),
        }
    }

    pub fn sent_frames(&self) -> Vec<FrameMessage> {
        self.frames.lock().unwrap().clone()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    /// Simulate the link dropping without ending the session
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Inject an inbound detection as if the peer had sent it
    pub async fn push_detection(&self, message: DetectionMessage) {
        let tx = self
            .detection_tx
            .lock()
            .unwrap()
            .clone()
            .expect("no detection subscription");
        tx.send(message).await.expect("detection stream closed");
    }
}

#[async_trait::async_trait]
impl FrameTransport for MemoryTransport {
    async fn open(&self, _session_id: &str) -> Result<()> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send_frame(&self, frame: &FrameMessage) -> Result<()> {
        if !self.connected.load(Ordering::SeqCst) {
            bail!("link is down");
        }
        self.frames.lock().unwrap().push(frame.clone());
        Ok(())
    }

    async fn subscribe_detections(&self) -> Result<mpsc::Receiver<DetectionMessage>> {
        let (tx, rx) = mpsc::channel(64);
        *self.detection_tx.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    fn state(&self) -> ConnectionState {
        if self.connected.load(Ordering::SeqCst) {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    async fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        *self.detection_tx.lock().unwrap() = None;
    }
}

/// Score store double that records every save call and can be switched into
/// a failing mode.
pub struct RecordingScoreStore {
    calls: Mutex<Vec<(String, u64)>>,
    failing: AtomicBool,
}

impl RecordingScoreStore {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(String, u64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ScoreStore for RecordingScoreStore {
    async fn save_score(&self, username: &str, score: u64) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((username.to_string(), score));
        if self.failing.load(Ordering::SeqCst) {
            bail!("store offline");
        }
        Ok(())
    }

    async fn top_scores(&self, _limit: usize) -> Result<Vec<LeaderboardEntry>> {
        Ok(Vec::new())
    }
}

pub fn test_profile() -> CameraProfile {
    CameraProfile {
        ideal_width: 320,
        ideal_height: 240,
        ideal_frame_rate: 30,
        min_width: 160,
        min_height: 120,
        min_frame_rate: 10,
        jpeg_quality: 70,
    }
}

/// Session config against the synthetic camera with a fast frame loop
pub fn test_session_config() -> SessionConfig {
    SessionConfig {
        session_id: "match-test".to_string(),
        camera_source: CameraSource::Synthetic,
        camera: test_profile(),
        frame_interval: Duration::from_millis(20),
        confidence_threshold: 0.5,
        debounce: Duration::from_millis(500),
    }
}
