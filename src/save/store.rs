use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

/// One ranked leaderboard row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub username: String,
    pub score: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SaveScoreRequest {
    username: String,
    score: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SaveScoreReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TopScoresRequest {
    limit: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct TopScoresReply {
    entries: Vec<LeaderboardEntry>,
}

/// Remote score store, reachable over request/reply.
///
/// The store is an opaque external collaborator; the workflow only cares
/// about save success/failure and the ranked read.
#[async_trait::async_trait]
pub trait ScoreStore: Send + Sync {
    async fn save_score(&self, username: &str, score: u64) -> Result<()>;

    async fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>>;
}

/// NATS request/reply implementation of the score store.
///
/// Connects lazily on first use; saves go to `<prefix>.save`, ranked reads
/// to `<prefix>.top`.
pub struct NatsScoreStore {
    url: String,
    subject_prefix: String,
    client: Mutex<Option<async_nats::Client>>,
}

impl NatsScoreStore {
    pub fn new(url: impl Into<String>, subject_prefix: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            subject_prefix: subject_prefix.into(),
            client: Mutex::new(None),
        }
    }

    async fn client(&self) -> Result<async_nats::Client> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        info!("Connecting to leaderboard store at {}", self.url);
        let client = async_nats::connect(&self.url)
            .await
            .context("Failed to connect to leaderboard store")?;
        *slot = Some(client.clone());
        Ok(client)
    }
}

#[async_trait::async_trait]
impl ScoreStore for NatsScoreStore {
    async fn save_score(&self, username: &str, score: u64) -> Result<()> {
        let client = self.client().await?;
        let subject = format!("{}.save", self.subject_prefix);

        let payload = serde_json::to_vec(&SaveScoreRequest {
            username: username.to_string(),
            score,
        })?;

        let response = client
            .request(subject, payload.into())
            .await
            .context("Leaderboard store unreachable")?;

        let reply: SaveScoreReply =
            serde_json::from_slice(&response.payload).context("Malformed save reply")?;

        if !reply.ok {
            bail!(
                "Leaderboard store rejected the save: {}",
                reply.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        info!("Saved score {} for {}", score, username);
        Ok(())
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let client = self.client().await?;
        let subject = format!("{}.top", self.subject_prefix);

        let payload = serde_json::to_vec(&TopScoresRequest { limit })?;

        let response = client
            .request(subject, payload.into())
            .await
            .context("Leaderboard store unreachable")?;

        let reply: TopScoresReply =
            serde_json::from_slice(&response.payload).context("Malformed leaderboard reply")?;

        Ok(reply.entries)
    }
}
