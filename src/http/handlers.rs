use super::state::AppState;
use crate::save::landing;
use crate::save::SubmitOutcome;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::error;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    pub session_id: String,
    pub status: String,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct SetDurationRequest {
    pub duration_secs: u32,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub save: bool,
}

#[derive(Debug, Deserialize)]
pub struct SubmitUsernameRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitUsernameResponse {
    pub outcome: String,
    pub step: crate::save::DialogStep,
    pub error: Option<String>,
    /// Present on success: landing URL carrying the leaderboard flag
    pub share_url: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/start
/// Request the camera and go live. Camera denial is reported in the
/// snapshot, not as an error status.
pub async fn start_session(State(state): State<AppState>) -> impl IntoResponse {
    if let Err(e) = state.controller.start_session().await {
        error!("Failed to start session: {:#}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to start session: {}", e),
            }),
        )
            .into_response();
    }

    (StatusCode::OK, Json(state.controller.snapshot())).into_response()
}

/// POST /session/stop
/// End the session; a scored session opens the save dialog.
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.stop_session().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(StopSessionResponse {
                session_id: state.controller.session_id().to_string(),
                status: "stopped".to_string(),
                total: stats.total,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to stop session: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to stop session: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /session/status
pub async fn session_status(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "session": state.controller.snapshot(),
        "timer": state.timer.snapshot(),
    });
    (StatusCode::OK, Json(body))
}

/// GET /stats
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.stats.snapshot()))
}

/// POST /timer/reset
/// Resets the match clock; statistics clear through the reset generation.
pub async fn reset_timer(State(state): State<AppState>) -> impl IntoResponse {
    state.timer.reset();
    (StatusCode::OK, Json(state.timer.snapshot()))
}

/// POST /timer/duration
pub async fn set_duration(
    State(state): State<AppState>,
    Json(req): Json<SetDurationRequest>,
) -> impl IntoResponse {
    if req.duration_secs == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "duration_secs must be at least 1".to_string(),
            }),
        )
            .into_response();
    }

    state.timer.set_duration(req.duration_secs);
    (StatusCode::OK, Json(state.timer.snapshot())).into_response()
}

/// GET /save
pub async fn save_state(State(state): State<AppState>) -> impl IntoResponse {
    let workflow = state.workflow.lock().await;
    (StatusCode::OK, Json(workflow.snapshot()))
}

/// POST /save/confirm
pub async fn confirm_save(
    State(state): State<AppState>,
    Json(req): Json<ConfirmRequest>,
) -> impl IntoResponse {
    let mut workflow = state.workflow.lock().await;
    workflow.confirm(req.save);
    (StatusCode::OK, Json(workflow.snapshot()))
}

/// POST /save/username
/// Submit the username; holds the dialog lock across the store round trip
/// so only one save can be in flight.
pub async fn submit_username(
    State(state): State<AppState>,
    Json(req): Json<SubmitUsernameRequest>,
) -> impl IntoResponse {
    let mut workflow = state.workflow.lock().await;
    let outcome = workflow.submit_username(&req.username).await;

    let (label, share_url) = match outcome {
        SubmitOutcome::Saved => ("saved", Some(landing::with_leaderboard_flag("/"))),
        SubmitOutcome::Failed => ("failed", None),
        SubmitOutcome::Rejected => ("rejected", None),
    };

    (
        StatusCode::OK,
        Json(SubmitUsernameResponse {
            outcome: label.to_string(),
            step: workflow.step(),
            error: workflow.error().map(|e| e.to_string()),
            share_url,
        }),
    )
}

/// GET /leaderboard
pub async fn leaderboard(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.top_scores(state.top_limit).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => {
            error!("Failed to read leaderboard: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to read leaderboard: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
