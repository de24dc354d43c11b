// Tests for the statistics aggregator, including the reset-generation
// propagation from the timer (no direct call between the two).

use brawlr_trainer::{MatchTimer, PunchCategory, StatsAggregator};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_total_always_equals_category_sum() {
    let stats = StatsAggregator::new();

    let sequence = [
        PunchCategory::Jab,
        PunchCategory::Jab,
        PunchCategory::Cross,
        PunchCategory::Hook,
        PunchCategory::Uppercut,
        PunchCategory::Cross,
        PunchCategory::Jab,
    ];

    for (i, category) in sequence.iter().enumerate() {
        stats.add_event(*category);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total, i as u64 + 1);
        assert_eq!(
            snapshot.total,
            snapshot.jab + snapshot.cross + snapshot.hook + snapshot.uppercut
        );
    }

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.jab, 3);
    assert_eq!(snapshot.cross, 2);
    assert_eq!(snapshot.hook, 1);
    assert_eq!(snapshot.uppercut, 1);
}

#[test]
fn test_unrecognized_label_is_ignored() {
    let stats = StatsAggregator::new();

    stats.add_label("jab");
    stats.add_label("superman");
    stats.add_label("");

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.total, 1);
    assert_eq!(snapshot.jab, 1);
}

#[test]
fn test_snapshot_is_a_copy() {
    let stats = StatsAggregator::new();
    stats.add_event(PunchCategory::Hook);

    let before = stats.snapshot();
    stats.add_event(PunchCategory::Hook);

    assert_eq!(before.hook, 1);
    assert_eq!(stats.snapshot().hook, 2);
}

#[test]
fn test_reset_zeroes_everything() {
    let stats = StatsAggregator::new();
    stats.add_event(PunchCategory::Jab);
    stats.add_event(PunchCategory::Uppercut);

    stats.reset();

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.total, 0);
    assert_eq!(snapshot.jab + snapshot.cross + snapshot.hook + snapshot.uppercut, 0);
}

#[tokio::test]
async fn test_timer_reset_alone_clears_statistics() {
    let timer = Arc::new(MatchTimer::new(180));
    let stats = Arc::new(StatsAggregator::new());

    // The only coupling: the aggregator observes the reset generation
    stats.observe_resets(timer.subscribe_resets());

    stats.add_event(PunchCategory::Jab);
    stats.add_event(PunchCategory::Cross);
    assert_eq!(stats.snapshot().total, 2);

    timer.reset();

    // Give the observer task a moment to see the generation advance
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(stats.snapshot().total, 0);

    // Every further advance clears again
    stats.add_event(PunchCategory::Hook);
    timer.reset();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(stats.snapshot().total, 0);
}

#[test]
fn test_category_labels_round_trip() {
    for category in [
        PunchCategory::Jab,
        PunchCategory::Cross,
        PunchCategory::Hook,
        PunchCategory::Uppercut,
    ] {
        assert_eq!(PunchCategory::from_label(category.label()), Some(category));
    }

    assert_eq!(PunchCategory::from_label("JAB"), None);
    assert_eq!(PunchCategory::from_label("haymaker"), None);
}
