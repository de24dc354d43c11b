//! HTTP API server standing in for the original UI actions
//!
//! This module provides a REST API for driving a training session:
//! - POST /session/start - Request the camera and go live
//! - POST /session/stop - End the session
//! - GET /session/status - Session + timer state
//! - GET /stats - Current punch statistics
//! - POST /timer/reset - Reset the match (clears statistics downstream)
//! - POST /timer/duration - Change the match duration
//! - GET /save - Save dialog state
//! - POST /save/confirm - Answer the confirmation step
//! - POST /save/username - Submit a username
//! - GET /leaderboard - Top ranked scores
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
