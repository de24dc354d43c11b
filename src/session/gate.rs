use std::time::{Duration, Instant};

/// Outcome of running one detection through the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Passed both filters; record it
    Accepted,
    /// Below the confidence threshold; ignored, clock untouched
    LowConfidence,
    /// Arrived within the debounce window of the last accepted event
    Debounced,
}

/// Confidence and debounce filter for inbound detections.
///
/// The debounce window is measured from the last ACCEPTED event only:
/// low-confidence and debounced arrivals never move the clock. The window is
/// global for the session, not per category: two different punch types
/// inside the window still collapse to one.
#[derive(Debug)]
pub struct DetectionGate {
    confidence_threshold: f32,
    debounce: Duration,
    last_accepted: Option<Instant>,
}

impl DetectionGate {
    pub fn new(confidence_threshold: f32, debounce: Duration) -> Self {
        Self {
            confidence_threshold,
            debounce,
            last_accepted: None,
        }
    }

    pub fn admit(&mut self, confidence: f32, now: Instant) -> GateDecision {
        if confidence < self.confidence_threshold {
            return GateDecision::LowConfidence;
        }

        if let Some(last) = self.last_accepted {
            if now.duration_since(last) < self.debounce {
                return GateDecision::Debounced;
            }
        }

        self.last_accepted = Some(now);
        GateDecision::Accepted
    }

    /// Clear the debounce clock (new session)
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}
