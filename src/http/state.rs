use std::sync::Arc;
use tokio::sync::Mutex;

use crate::save::{SaveWorkflow, ScoreStore};
use crate::session::SessionController;
use crate::stats::StatsAggregator;
use crate::timer::MatchTimer;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub timer: Arc<MatchTimer>,
    pub stats: Arc<StatsAggregator>,
    pub workflow: Arc<Mutex<SaveWorkflow>>,
    pub store: Arc<dyn ScoreStore>,
    /// How many rows the leaderboard read returns
    pub top_limit: usize,
}
