// Tests for the detection gate: confidence threshold and the global
// debounce window measured from the last accepted event.

use brawlr_trainer::session::{DetectionGate, GateDecision};
use std::time::{Duration, Instant};

fn gate() -> DetectionGate {
    DetectionGate::new(0.5, Duration::from_millis(500))
}

#[test]
fn test_events_inside_the_window_are_debounced() {
    let mut gate = gate();
    let t0 = Instant::now();

    assert_eq!(gate.admit(0.9, t0), GateDecision::Accepted);
    assert_eq!(
        gate.admit(0.9, t0 + Duration::from_millis(499)),
        GateDecision::Debounced
    );
}

#[test]
fn test_events_at_or_past_the_window_are_accepted() {
    let mut gate = gate();
    let t0 = Instant::now();

    assert_eq!(gate.admit(0.9, t0), GateDecision::Accepted);
    assert_eq!(
        gate.admit(0.9, t0 + Duration::from_millis(500)),
        GateDecision::Accepted
    );
    assert_eq!(
        gate.admit(0.9, t0 + Duration::from_millis(1_200)),
        GateDecision::Accepted
    );
}

#[test]
fn test_low_confidence_never_touches_the_clock() {
    let mut gate = gate();
    let t0 = Instant::now();

    assert_eq!(gate.admit(0.49, t0), GateDecision::LowConfidence);

    // Had the low-confidence event moved the clock, this would be debounced
    assert_eq!(
        gate.admit(0.9, t0 + Duration::from_millis(10)),
        GateDecision::Accepted
    );
}

#[test]
fn test_threshold_is_inclusive() {
    let mut gate = gate();
    assert_eq!(gate.admit(0.5, Instant::now()), GateDecision::Accepted);
}

#[test]
fn test_debounced_events_do_not_extend_the_window() {
    let mut gate = gate();
    let t0 = Instant::now();

    assert_eq!(gate.admit(0.9, t0), GateDecision::Accepted);
    assert_eq!(
        gate.admit(0.9, t0 + Duration::from_millis(400)),
        GateDecision::Debounced
    );

    // Measured from t0, not from the debounced arrival at t0+400
    assert_eq!(
        gate.admit(0.9, t0 + Duration::from_millis(600)),
        GateDecision::Accepted
    );
}

#[test]
fn test_reset_clears_the_clock() {
    let mut gate = gate();
    let t0 = Instant::now();

    assert_eq!(gate.admit(0.9, t0), GateDecision::Accepted);
    gate.reset();
    assert_eq!(
        gate.admit(0.9, t0 + Duration::from_millis(10)),
        GateDecision::Accepted
    );
}
