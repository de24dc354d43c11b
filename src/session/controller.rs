use anyhow::Result;
use base64::Engine;
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::gate::{DetectionGate, GateDecision};
use crate::camera::{CameraBackend, CameraFactory, VideoFrame};
use crate::inference::{ConnectionState, DetectionMessage, FrameMessage, FrameTransport};
use crate::stats::{PunchStats, StatsAggregator};
use crate::timer::{ExpiryHandle, MatchTimer};

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Requesting,
    Live,
    Stopped,
}

/// Point-in-time view of the session, served over the status API
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub status: SessionStatus,
    pub connection: ConnectionState,
    /// The original surfaces this as the "Camera Off" label
    pub camera_denied: bool,
}

/// Emitted once per session teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// At least one punch was recorded; the save workflow should open
    ScorePending { stats: PunchStats },
    /// Nothing recorded; the leaderboard store is never contacted
    NothingToSave,
}

/// Owns the camera, the frame loop, and the detection stream for one
/// session at a time.
///
/// `start_session` and `stop_session` serialize on a single operation guard;
/// a start in flight completes (or backs out) before a stop is processed,
/// and vice versa. All teardown paths (user stop, timer expiry, service
/// shutdown) converge on `stop_session`, which is idempotent.
pub struct SessionController {
    config: SessionConfig,
    timer: Arc<MatchTimer>,
    stats: Arc<StatsAggregator>,
    transport: Arc<dyn FrameTransport>,

    status: StdMutex<SessionStatus>,
    camera_denied: AtomicBool,
    op_guard: Mutex<()>,

    camera: Mutex<Option<Box<dyn CameraBackend>>>,
    shutdown_tx: StdMutex<Option<watch::Sender<bool>>>,
    pump_task: Mutex<Option<JoinHandle<()>>>,
    frame_task: Mutex<Option<JoinHandle<()>>>,
    detection_task: Mutex<Option<JoinHandle<()>>>,

    gate: Arc<StdMutex<DetectionGate>>,
    end_tx: mpsc::UnboundedSender<SessionEnd>,
    _expiry_handle: ExpiryHandle,
}

impl SessionController {
    /// Create a controller wired to the timer and aggregator.
    ///
    /// Returns the controller plus the receiver of session-end events; the
    /// caller routes those into the save workflow. The controller registers
    /// a timer-expiry listener so the match clock running out stops the
    /// session through the same path as a user stop.
    pub fn new(
        config: SessionConfig,
        timer: Arc<MatchTimer>,
        stats: Arc<StatsAggregator>,
        transport: Arc<dyn FrameTransport>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<SessionEnd>) {
        let (end_tx, end_rx) = mpsc::unbounded_channel();
        let (expire_tx, mut expire_rx) = mpsc::unbounded_channel::<()>();

        let expiry_handle = timer.on_expire(move || {
            let _ = expire_tx.send(());
        });

        let gate = Arc::new(StdMutex::new(DetectionGate::new(
            config.confidence_threshold,
            config.debounce,
        )));

        let controller = Arc::new(Self {
            config,
            timer,
            stats,
            transport,
            status: StdMutex::new(SessionStatus::Idle),
            camera_denied: AtomicBool::new(false),
            op_guard: Mutex::new(()),
            camera: Mutex::new(None),
            shutdown_tx: StdMutex::new(None),
            pump_task: Mutex::new(None),
            frame_task: Mutex::new(None),
            detection_task: Mutex::new(None),
            gate,
            end_tx,
            _expiry_handle: expiry_handle,
        });

        // Expiry listeners run inside the timer's dispatch; hop onto a task
        // so the async teardown happens outside it
        let weak = Arc::downgrade(&controller);
        tokio::spawn(async move {
            while expire_rx.recv().await.is_some() {
                let Some(controller) = weak.upgrade() else {
                    break;
                };
                if let Err(e) = controller.stop_session().await {
                    error!("Failed to stop session on timer expiry: {:#}", e);
                }
            }
        });

        (controller, end_rx)
    }

    /// Start a session: request the camera, go live, start the match clock,
    /// and open the inference link.
    ///
    /// Camera denial is not an error: the controller returns to Idle with
    /// the camera-denied flag set. A failed inference connection leaves the
    /// session live; capture ticks skip until the link is up.
    pub async fn start_session(&self) -> Result<()> {
        let _op = self.op_guard.lock().await;

        if *self.status.lock().unwrap() != SessionStatus::Idle {
            warn!("Session already active");
            return Ok(());
        }

        info!("Starting session {}", self.config.session_id);
        self.set_status(SessionStatus::Requesting);
        self.camera_denied.store(false, Ordering::SeqCst);

        let mut backend = match CameraFactory::create(
            self.config.camera_source.clone(),
            self.config.camera.clone(),
        ) {
            Ok(backend) => backend,
            Err(e) => {
                warn!("Camera unavailable: {:#}", e);
                return self.deny_camera();
            }
        };

        let frames = match backend.start().await {
            Ok(rx) => rx,
            Err(e) => {
                warn!("Camera request denied: {:#}", e);
                return self.deny_camera();
            }
        };

        // Camera granted: the session is live and the match clock runs
        self.set_status(SessionStatus::Live);
        *self.camera.lock().await = Some(backend);
        self.gate.lock().unwrap().reset();
        self.timer.start();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        *self.shutdown_tx.lock().unwrap() = Some(shutdown_tx);

        // Latest-frame slot: capture ticks sample the newest frame and older
        // ones are overwritten, never queued
        let (latest_tx, latest_rx) = watch::channel::<Option<VideoFrame>>(None);

        {
            let mut pump = self.pump_task.lock().await;
            *pump = Some(tokio::spawn(pump_frames(
                frames,
                latest_tx,
                shutdown_rx.clone(),
            )));
        }

        if let Err(e) = self.transport.open(&self.config.session_id).await {
            warn!(
                "Inference service unreachable, session continues without detections: {:#}",
                e
            );
        }

        {
            let mut frame_task = self.frame_task.lock().await;
            *frame_task = Some(tokio::spawn(frame_loop(
                Arc::clone(&self.transport),
                latest_rx,
                shutdown_rx.clone(),
                self.config.frame_interval,
            )));
        }

        match self.transport.subscribe_detections().await {
            Ok(detections) => {
                let mut detection_task = self.detection_task.lock().await;
                *detection_task = Some(tokio::spawn(detection_loop(
                    detections,
                    Arc::clone(&self.stats),
                    Arc::clone(&self.gate),
                    shutdown_rx,
                )));
            }
            Err(e) => {
                warn!("No detection stream for this session: {:#}", e);
            }
        }

        info!("Session {} is live", self.config.session_id);
        Ok(())
    }

    /// Stop the session and release everything it holds.
    ///
    /// Safe to call at any time, any number of times, including before a
    /// start ever happened. Emits the session-end event only when an active
    /// session was actually torn down.
    pub async fn stop_session(&self) -> Result<PunchStats> {
        let _op = self.op_guard.lock().await;

        let was_live = *self.status.lock().unwrap() == SessionStatus::Live;
        if was_live {
            info!("Stopping session {}", self.config.session_id);
        }

        if let Some(shutdown) = self.shutdown_tx.lock().unwrap().take() {
            let _ = shutdown.send(true);
        }

        {
            let mut task = self.pump_task.lock().await;
            if let Some(task) = task.take() {
                if let Err(e) = task.await {
                    error!("Frame pump task panicked: {}", e);
                }
            }
        }

        {
            let mut task = self.frame_task.lock().await;
            if let Some(task) = task.take() {
                if let Err(e) = task.await {
                    error!("Frame loop task panicked: {}", e);
                }
            }
        }

        {
            let mut task = self.detection_task.lock().await;
            if let Some(task) = task.take() {
                if let Err(e) = task.await {
                    error!("Detection task panicked: {}", e);
                }
            }
        }

        // Release the camera; holds nothing if no session was active
        if let Some(mut camera) = self.camera.lock().await.take() {
            if let Err(e) = camera.stop().await {
                error!("Failed to release camera: {:#}", e);
            }
        }

        self.transport.close().await;
        self.timer.stop();

        self.set_status(SessionStatus::Stopped);
        let snapshot = self.stats.snapshot();

        if was_live {
            if snapshot.total >= 1 {
                info!("Session ended with {} punches", snapshot.total);
                let _ = self.end_tx.send(SessionEnd::ScorePending {
                    stats: snapshot.clone(),
                });
            } else {
                info!("Session ended with nothing to save");
                let _ = self.end_tx.send(SessionEnd::NothingToSave);
            }
        }

        self.set_status(SessionStatus::Idle);
        Ok(snapshot)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.config.session_id.clone(),
            status: *self.status.lock().unwrap(),
            connection: self.transport.state(),
            camera_denied: self.camera_denied.load(Ordering::SeqCst),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Whether the controller currently holds the camera device
    pub async fn camera_active(&self) -> bool {
        self.camera.lock().await.is_some()
    }

    fn deny_camera(&self) -> Result<()> {
        self.camera_denied.store(true, Ordering::SeqCst);
        self.set_status(SessionStatus::Idle);
        info!("Camera off: session not started");
        Ok(())
    }

    fn set_status(&self, status: SessionStatus) {
        *self.status.lock().unwrap() = status;
    }
}

/// Forward camera frames into the latest-frame slot
async fn pump_frames(
    mut frames: mpsc::Receiver<VideoFrame>,
    latest: watch::Sender<Option<VideoFrame>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            frame = frames.recv() => {
                match frame {
                    Some(frame) => {
                        let _ = latest.send(Some(frame));
                    }
                    None => break,
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

/// Publish the newest frame every tick while the link is connected.
///
/// Frames are best-effort: a tick with the link down, or with no frame
/// captured yet, is skipped without queueing.
async fn frame_loop(
    transport: Arc<dyn FrameTransport>,
    latest: watch::Receiver<Option<VideoFrame>>,
    mut shutdown: watch::Receiver<bool>,
    period: std::time::Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if transport.state() != ConnectionState::Connected {
                    continue;
                }

                let Some(frame) = latest.borrow().clone() else {
                    continue;
                };

                let image = encode_data_uri(&frame.jpeg);
                let message = FrameMessage::new(image, Utc::now().timestamp_millis());

                if let Err(e) = transport.send_frame(&message).await {
                    error!("Failed to publish frame: {:#}", e);
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

/// Consume inbound detections, applying the confidence filter and the
/// global debounce gate before recording
async fn detection_loop(
    mut detections: mpsc::Receiver<DetectionMessage>,
    stats: Arc<StatsAggregator>,
    gate: Arc<StdMutex<DetectionGate>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            message = detections.recv() => {
                match message {
                    Some(message) => apply_detection(&message, &stats, &gate),
                    None => {
                        info!("Detection stream ended");
                        break;
                    }
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

fn apply_detection(
    message: &DetectionMessage,
    stats: &StatsAggregator,
    gate: &StdMutex<DetectionGate>,
) {
    let DetectionMessage::Punch {
        punch_type,
        confidence,
    } = message
    else {
        return;
    };

    let decision = gate.lock().unwrap().admit(*confidence, Instant::now());
    match decision {
        GateDecision::LowConfidence => {
            debug!(
                "Ignoring low-confidence {} ({:.2})",
                punch_type, confidence
            );
        }
        GateDecision::Debounced => {
            debug!("Debounced {} ({:.2})", punch_type, confidence);
        }
        GateDecision::Accepted => stats.add_label(punch_type),
    }
}

fn encode_data_uri(jpeg: &[u8]) -> String {
    format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(jpeg)
    )
}
