use serde::Serialize;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

type ExpiryCallback = Arc<dyn Fn() + Send + Sync>;

struct TimerState {
    duration_secs: u32,
    remaining_secs: u32,
    running: bool,
    reset_generation: u64,
    listeners: Vec<(u64, ExpiryCallback)>,
    next_listener_id: u64,
}

/// Countdown timer for one match.
///
/// Created once per session context and kept for the process lifetime. The
/// countdown itself is a synchronous `tick()`; pacing comes from a single
/// background task started with `start_ticker()`, so a stopped timer never
/// leaves a stray tick racing a restart.
pub struct MatchTimer {
    state: Arc<Mutex<TimerState>>,
    reset_tx: watch::Sender<u64>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

/// Point-in-time view of the timer, served over the status API
#[derive(Debug, Clone, Serialize)]
pub struct TimerSnapshot {
    pub duration_secs: u32,
    pub remaining_secs: u32,
    pub running: bool,
}

/// Registration handle for an expiry listener. Dropping the handle keeps the
/// listener; call `unregister()` to remove it.
pub struct ExpiryHandle {
    id: u64,
    state: Weak<Mutex<TimerState>>,
}

impl ExpiryHandle {
    pub fn unregister(self) {
        if let Some(state) = self.state.upgrade() {
            let mut s = state.lock().unwrap();
            s.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl MatchTimer {
    pub fn new(duration_secs: u32) -> Self {
        let duration_secs = duration_secs.max(1);
        let (reset_tx, _) = watch::channel(0u64);

        Self {
            state: Arc::new(Mutex::new(TimerState {
                duration_secs,
                remaining_secs: duration_secs,
                running: false,
                reset_generation: 0,
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
            reset_tx,
            ticker: Mutex::new(None),
        }
    }

    /// Spawn the 1 Hz pacing task. Idempotent; the task lives as long as the
    /// timer and no-ops while the timer is stopped.
    pub fn start_ticker(self: &Arc<Self>) {
        let mut ticker = self.ticker.lock().unwrap();
        if ticker.is_some() {
            return;
        }

        let timer = Arc::clone(self);
        *ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // Consume the immediate first tick so the initial decrement
            // lands a full second after start
            interval.tick().await;
            loop {
                interval.tick().await;
                timer.tick();
            }
        }));
    }

    pub fn start(&self) {
        let mut s = self.state.lock().unwrap();
        if s.running {
            warn!("Timer already running");
            return;
        }
        if s.remaining_secs == 0 {
            warn!("Timer start ignored: no time remaining (reset first)");
            return;
        }
        s.running = true;
        info!("Match timer started ({}s remaining)", s.remaining_secs);
    }

    pub fn stop(&self) {
        let mut s = self.state.lock().unwrap();
        s.running = false;
    }

    /// Change the match duration.
    ///
    /// While stopped this also resets the remaining time. While running it
    /// only moves the ceiling used by the next `reset()`; the live countdown
    /// is left alone.
    pub fn set_duration(&self, duration_secs: u32) {
        let duration_secs = duration_secs.max(1);
        let mut s = self.state.lock().unwrap();
        s.duration_secs = duration_secs;
        if !s.running {
            s.remaining_secs = duration_secs;
        }
    }

    /// Stop the countdown, restore the full duration, and advance the reset
    /// generation so downstream state (statistics) clears itself.
    pub fn reset(&self) {
        let generation = {
            let mut s = self.state.lock().unwrap();
            s.running = false;
            s.remaining_secs = s.duration_secs;
            s.reset_generation += 1;
            s.reset_generation
        };

        info!("Match reset (generation {})", generation);
        let _ = self.reset_tx.send(generation);
    }

    /// Register a callback invoked exactly once each time the countdown
    /// reaches zero, in registration order.
    pub fn on_expire<F>(&self, callback: F) -> ExpiryHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut s = self.state.lock().unwrap();
        let id = s.next_listener_id;
        s.next_listener_id += 1;
        s.listeners.push((id, Arc::new(callback)));

        ExpiryHandle {
            id,
            state: Arc::downgrade(&self.state),
        }
    }

    /// Observe reset-generation advances. Only changes after subscription are
    /// delivered.
    pub fn subscribe_resets(&self) -> watch::Receiver<u64> {
        self.reset_tx.subscribe()
    }

    /// Advance the countdown by one second.
    ///
    /// The running flag flips off in the same critical section as the final
    /// decrement; listeners are dispatched from a snapshot taken under the
    /// lock and invoked outside it, so a listener may call `start`/`stop`/
    /// `reset` without deadlocking or racing the next tick.
    pub fn tick(&self) {
        let expired = {
            let mut s = self.state.lock().unwrap();
            if !s.running || s.remaining_secs == 0 {
                return;
            }
            s.remaining_secs -= 1;
            if s.remaining_secs == 0 {
                s.running = false;
                Some(s.listeners.iter().map(|(_, cb)| Arc::clone(cb)).collect::<Vec<_>>())
            } else {
                None
            }
        };

        if let Some(listeners) = expired {
            info!("Match ended");
            for listener in listeners {
                listener();
            }
        }
    }

    pub fn remaining(&self) -> u32 {
        self.state.lock().unwrap().remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let s = self.state.lock().unwrap();
        TimerSnapshot {
            duration_secs: s.duration_secs,
            remaining_secs: s.remaining_secs,
            running: s.running,
        }
    }
}
