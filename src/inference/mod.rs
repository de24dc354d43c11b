//! Link to the remote punch-inference service
//!
//! Outbound: JPEG frames wrapped as tagged JSON messages, published while a
//! session is live. Inbound: classified detection events on a subscription.
//! The transport is a trait so the session controller can run against an
//! in-memory double; the production implementation speaks NATS.

pub mod messages;
pub mod nats;
pub mod transport;

pub use messages::{DetectionMessage, FrameMessage};
pub use nats::NatsTransport;
pub use transport::{ConnectionState, FrameTransport};
