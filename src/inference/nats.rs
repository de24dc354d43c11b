use anyhow::{Context, Result};
use futures::stream::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::messages::{DetectionMessage, FrameMessage};
use super::transport::{ConnectionState, FrameTransport};

struct Link {
    client: async_nats::Client,
    session_id: String,
}

/// NATS-backed inference link.
///
/// Frames are published to `<prefix>.frames.<session_id>`; detections arrive
/// on `<prefix>.detections.<session_id>`.
pub struct NatsTransport {
    url: String,
    subject_prefix: String,
    link: RwLock<Option<Link>>,
    connecting: AtomicBool,
}

impl NatsTransport {
    pub fn new(url: impl Into<String>, subject_prefix: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            subject_prefix: subject_prefix.into(),
            link: RwLock::new(None),
            connecting: AtomicBool::new(false),
        }
    }

    fn frame_subject(&self, session_id: &str) -> String {
        format!("{}.frames.{}", self.subject_prefix, session_id)
    }

    fn detection_subject(&self, session_id: &str) -> String {
        format!("{}.detections.{}", self.subject_prefix, session_id)
    }
}

#[async_trait::async_trait]
impl FrameTransport for NatsTransport {
    async fn open(&self, session_id: &str) -> Result<()> {
        if self.link.read().unwrap().is_some() {
            warn!("Inference link already open");
            return Ok(());
        }

        info!("Connecting to inference service at {}", self.url);
        self.connecting.store(true, Ordering::SeqCst);

        let connected = async_nats::connect(&self.url)
            .await
            .context("Failed to connect to inference service");
        self.connecting.store(false, Ordering::SeqCst);
        let client = connected?;

        info!("Connected to inference service");

        *self.link.write().unwrap() = Some(Link {
            client,
            session_id: session_id.to_string(),
        });

        Ok(())
    }

    async fn send_frame(&self, frame: &FrameMessage) -> Result<()> {
        let (client, subject) = {
            let link = self.link.read().unwrap();
            let link = link.as_ref().context("Inference link is not open")?;
            (link.client.clone(), self.frame_subject(&link.session_id))
        };

        let payload = serde_json::to_vec(frame)?;

        client
            .publish(subject, payload.into())
            .await
            .context("Failed to publish frame")?;

        Ok(())
    }

    async fn subscribe_detections(&self) -> Result<mpsc::Receiver<DetectionMessage>> {
        let (client, subject) = {
            let link = self.link.read().unwrap();
            let link = link.as_ref().context("Inference link is not open")?;
            (
                link.client.clone(),
                self.detection_subject(&link.session_id),
            )
        };

        info!("Subscribing to detections on {}", subject);

        let mut subscriber = client
            .subscribe(subject)
            .await
            .context("Failed to subscribe to detections")?;

        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<DetectionMessage>(&msg.payload) {
                    Ok(detection) => {
                        if tx.send(detection).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse detection message: {}", e);
                    }
                }
            }
            info!("Detection subscription closed");
        });

        Ok(rx)
    }

    fn state(&self) -> ConnectionState {
        if let Some(link) = self.link.read().unwrap().as_ref() {
            match link.client.connection_state() {
                async_nats::connection::State::Connected => ConnectionState::Connected,
                async_nats::connection::State::Pending => ConnectionState::Connecting,
                async_nats::connection::State::Disconnected => ConnectionState::Disconnected,
            }
        } else if self.connecting.load(Ordering::SeqCst) {
            ConnectionState::Connecting
        } else {
            ConnectionState::Disconnected
        }
    }

    async fn close(&self) {
        // async-nats handles cleanup on drop
        if self.link.write().unwrap().take().is_some() {
            info!("Inference link closed");
        }
    }
}
