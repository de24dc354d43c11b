//! Post-session save workflow
//!
//! A two-step confirm/username dialog that negotiates persisting the final
//! score to the leaderboard store, plus the store client itself and the
//! landing-view leaderboard flag helpers.

pub mod landing;
pub mod store;
mod workflow;

pub use store::{LeaderboardEntry, NatsScoreStore, ScoreStore};
pub use workflow::{
    spawn_match_end_listener, DialogStep, SaveWorkflow, SubmitOutcome, WorkflowSnapshot,
};
