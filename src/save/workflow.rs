use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::store::ScoreStore;
use crate::session::SessionEnd;

/// Dialog position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogStep {
    Confirm,
    Username,
    Closed,
}

/// Result of a username submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed or the dialog was not at the username step;
    /// nothing was sent
    Rejected,
    /// The store accepted the score; the dialog is closed
    Saved,
    /// The store failed; the dialog stays open for a retry
    Failed,
}

/// Two-step save dialog: Confirm -> Username -> closed.
///
/// Owned behind an async mutex by the control surface; holding the lock
/// across `submit_username`'s store round trip is what makes the save the
/// single in-flight attempt.
pub struct SaveWorkflow {
    store: Arc<dyn ScoreStore>,
    step: DialogStep,
    final_score: u64,
    username: String,
    error: Option<String>,
}

/// View of the dialog served to clients
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSnapshot {
    pub step: DialogStep,
    pub final_score: u64,
    pub username: String,
    pub error: Option<String>,
}

impl SaveWorkflow {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self {
            store,
            step: DialogStep::Closed,
            final_score: 0,
            username: String::new(),
            error: None,
        }
    }

    /// Open (or reopen) the dialog for a freshly ended session. Always
    /// re-arms at Confirm with cleared username and error.
    pub fn open(&mut self, final_score: u64) {
        self.step = DialogStep::Confirm;
        self.final_score = final_score;
        self.username.clear();
        self.error = None;
        info!("Save dialog opened (final score {})", final_score);
    }

    /// Answer the confirmation step. Declining closes with no side effects.
    pub fn confirm(&mut self, save: bool) {
        if self.step != DialogStep::Confirm {
            warn!("Confirm ignored: dialog not at confirmation step");
            return;
        }
        self.step = if save {
            DialogStep::Username
        } else {
            DialogStep::Closed
        };
    }

    /// Validate and submit the username.
    ///
    /// The store call is awaited before any transition: success closes the
    /// dialog, failure keeps it at Username with the typed name preserved
    /// and a retry-eligible error.
    pub async fn submit_username(&mut self, input: &str) -> SubmitOutcome {
        if self.step != DialogStep::Username {
            warn!("Submit ignored: dialog not at username step");
            return SubmitOutcome::Rejected;
        }

        // Keep what the user typed so a failed attempt can be edited
        self.username = input.to_string();

        let trimmed = input.trim();
        if trimmed.chars().count() < 3 {
            self.error = Some("Username must be at least 3 characters.".to_string());
            return SubmitOutcome::Rejected;
        }

        self.error = None;
        match self.store.save_score(trimmed, self.final_score).await {
            Ok(()) => {
                self.step = DialogStep::Closed;
                SubmitOutcome::Saved
            }
            Err(e) => {
                warn!("Score save failed: {:#}", e);
                self.error = Some("Could not save your score. Please try again.".to_string());
                SubmitOutcome::Failed
            }
        }
    }

    pub fn step(&self) -> DialogStep {
        self.step
    }

    pub fn final_score(&self) -> u64 {
        self.final_score
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            step: self.step,
            final_score: self.final_score,
            username: self.username.clone(),
            error: self.error.clone(),
        }
    }
}

/// Route session-end events into the dialog: a scored session opens it,
/// an empty one only leaves the nothing-to-save notice in the log.
pub fn spawn_match_end_listener(
    mut ends: mpsc::UnboundedReceiver<SessionEnd>,
    workflow: Arc<Mutex<SaveWorkflow>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(end) = ends.recv().await {
            match end {
                SessionEnd::ScorePending { stats } => {
                    workflow.lock().await.open(stats.total);
                }
                SessionEnd::NothingToSave => {
                    info!("No punches recorded; skipping save dialog");
                }
            }
        }
    })
}
