//! Punch statistics aggregation
//!
//! Keeps the running tally for the current match. The aggregator never calls
//! into the timer; it observes the timer's reset generation through a watch
//! channel, so a match reset clears the tally with no direct coupling.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The closed set of punch classifications the inference service emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunchCategory {
    Jab,
    Cross,
    Hook,
    Uppercut,
}

impl PunchCategory {
    /// Parse a wire label. Unknown labels yield None and the event is
    /// ignored rather than failing the message.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "jab" => Some(Self::Jab),
            "cross" => Some(Self::Cross),
            "hook" => Some(Self::Hook),
            "uppercut" => Some(Self::Uppercut),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Jab => "jab",
            Self::Cross => "cross",
            Self::Hook => "hook",
            Self::Uppercut => "uppercut",
        }
    }
}

/// Punch tally for one match. `total` always equals the sum of the
/// per-category counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchStats {
    pub total: u64,
    pub jab: u64,
    pub cross: u64,
    pub hook: u64,
    pub uppercut: u64,
}

impl PunchStats {
    pub fn count(&self, category: PunchCategory) -> u64 {
        match category {
            PunchCategory::Jab => self.jab,
            PunchCategory::Cross => self.cross,
            PunchCategory::Hook => self.hook,
            PunchCategory::Uppercut => self.uppercut,
        }
    }
}

/// Single-writer aggregator; readers take copy-on-read snapshots.
pub struct StatsAggregator {
    stats: Mutex<PunchStats>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            stats: Mutex::new(PunchStats::default()),
        }
    }

    /// Record one accepted detection. Total and the category counter move
    /// together under the lock, so snapshots never see them out of step.
    pub fn add_event(&self, category: PunchCategory) {
        let mut stats = self.stats.lock().unwrap();
        stats.total += 1;
        match category {
            PunchCategory::Jab => stats.jab += 1,
            PunchCategory::Cross => stats.cross += 1,
            PunchCategory::Hook => stats.hook += 1,
            PunchCategory::Uppercut => stats.uppercut += 1,
        }
    }

    /// Record by wire label. Unrecognized labels are a no-op.
    pub fn add_label(&self, label: &str) {
        match PunchCategory::from_label(label) {
            Some(category) => self.add_event(category),
            None => debug!("Ignoring unrecognized punch label: {}", label),
        }
    }

    pub fn reset(&self) {
        *self.stats.lock().unwrap() = PunchStats::default();
    }

    pub fn snapshot(&self) -> PunchStats {
        self.stats.lock().unwrap().clone()
    }

    /// Spawn the observer task that clears the tally whenever the reset
    /// generation advances, regardless of why it advanced.
    pub fn observe_resets(self: &Arc<Self>, mut resets: watch::Receiver<u64>) -> JoinHandle<()> {
        let aggregator = Arc::clone(self);
        tokio::spawn(async move {
            while resets.changed().await.is_ok() {
                let generation = *resets.borrow();
                aggregator.reset();
                info!("Statistics cleared (reset generation {})", generation);
            }
        })
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}
