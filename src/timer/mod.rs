//! Match timer engine
//!
//! Owns the countdown clock for a training session:
//! - per-second countdown while running
//! - expiry listeners with unregister handles, dispatched exactly once
//! - a monotonically increasing "reset generation" broadcast on a watch
//!   channel, observed by components that derive state from the match

mod engine;

pub use engine::{ExpiryHandle, MatchTimer, TimerSnapshot};
