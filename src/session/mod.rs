//! Capture session management
//!
//! This module provides the `SessionController` abstraction that manages:
//! - Exclusive ownership of the camera device for the session's lifetime
//! - The 100 ms best-effort frame publishing loop
//! - The inbound detection stream with confidence and debounce gating
//! - Convergent, idempotent teardown (user stop, timer expiry, shutdown)

mod config;
mod controller;
mod gate;

pub use config::SessionConfig;
pub use controller::{SessionController, SessionEnd, SessionSnapshot, SessionStatus};
pub use gate::{DetectionGate, GateDecision};
