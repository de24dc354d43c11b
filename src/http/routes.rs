use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/session/start", post(handlers::start_session))
        .route("/session/stop", post(handlers::stop_session))
        .route("/session/status", get(handlers::session_status))
        // Match timer
        .route("/timer/reset", post(handlers::reset_timer))
        .route("/timer/duration", post(handlers::set_duration))
        // Statistics
        .route("/stats", get(handlers::get_stats))
        // Save workflow
        .route("/save", get(handlers::save_state))
        .route("/save/confirm", post(handlers::confirm_save))
        .route("/save/username", post(handlers::submit_username))
        // Leaderboard
        .route("/leaderboard", get(handlers::leaderboard))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
