use anyhow::Result;
use serde::Serialize;
use tokio::sync::mpsc;

use super::messages::{DetectionMessage, FrameMessage};

/// Connection state of the inference link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Persistent bidirectional link to the inference peer.
///
/// Frames flow out best-effort; the session controller checks `state()` at
/// each capture tick and skips publishing while the link is not connected.
/// Detections flow in on a channel produced by `subscribe_detections`.
#[async_trait::async_trait]
pub trait FrameTransport: Send + Sync {
    /// Open the link for the given session. Single in-flight open at a time;
    /// an error leaves the link disconnected but is not fatal to the session.
    async fn open(&self, session_id: &str) -> Result<()>;

    /// Publish one frame message
    async fn send_frame(&self, frame: &FrameMessage) -> Result<()>;

    /// Subscribe to the inbound detection stream for the open session
    async fn subscribe_detections(&self) -> Result<mpsc::Receiver<DetectionMessage>>;

    fn state(&self) -> ConnectionState;

    /// Close the link. Safe to call when never opened.
    async fn close(&self);
}
