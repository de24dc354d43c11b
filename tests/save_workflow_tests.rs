// Tests for the save workflow dialog and the landing leaderboard flag.

mod common;

use common::RecordingScoreStore;

use brawlr_trainer::save::{landing, DialogStep, SaveWorkflow, SubmitOutcome};
use std::sync::Arc;

fn workflow() -> (SaveWorkflow, Arc<RecordingScoreStore>) {
    let store = Arc::new(RecordingScoreStore::new());
    (SaveWorkflow::new(store.clone()), store)
}

#[tokio::test]
async fn test_decline_closes_without_side_effects() {
    let (mut dialog, store) = workflow();

    dialog.open(5);
    assert_eq!(dialog.step(), DialogStep::Confirm);
    assert_eq!(dialog.final_score(), 5);

    dialog.confirm(false);
    assert_eq!(dialog.step(), DialogStep::Closed);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_short_username_is_rejected_then_valid_one_saves() {
    let (mut dialog, store) = workflow();

    dialog.open(5);
    dialog.confirm(true);
    assert_eq!(dialog.step(), DialogStep::Username);

    // Too short: field error, no remote call, dialog stays put
    let outcome = dialog.submit_username("ab").await;
    assert_eq!(outcome, SubmitOutcome::Rejected);
    assert_eq!(dialog.step(), DialogStep::Username);
    assert!(dialog.error().is_some());
    assert!(store.calls().is_empty());

    // Valid: exactly one save with the trimmed name and the final score
    let outcome = dialog.submit_username("abc").await;
    assert_eq!(outcome, SubmitOutcome::Saved);
    assert_eq!(dialog.step(), DialogStep::Closed);
    assert_eq!(store.calls(), vec![("abc".to_string(), 5)]);
}

#[tokio::test]
async fn test_username_is_trimmed_before_validation_and_save() {
    let (mut dialog, store) = workflow();

    dialog.open(12);
    dialog.confirm(true);

    // Whitespace padding does not rescue a short name
    assert_eq!(dialog.submit_username("  ab  ").await, SubmitOutcome::Rejected);
    assert!(store.calls().is_empty());

    assert_eq!(
        dialog.submit_username("  PunchMaster  ").await,
        SubmitOutcome::Saved
    );
    assert_eq!(store.calls(), vec![("PunchMaster".to_string(), 12)]);
}

#[tokio::test]
async fn test_store_failure_keeps_the_dialog_open_for_retry() {
    let (mut dialog, store) = workflow();
    store.set_failing(true);

    dialog.open(7);
    dialog.confirm(true);

    let outcome = dialog.submit_username("champ").await;
    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(dialog.step(), DialogStep::Username);
    assert!(dialog.error().is_some());

    // The typed name survives the failure for resubmission
    assert_eq!(dialog.username(), "champ");

    store.set_failing(false);
    let outcome = dialog.submit_username("champ").await;
    assert_eq!(outcome, SubmitOutcome::Saved);
    assert_eq!(dialog.step(), DialogStep::Closed);
    assert_eq!(
        store.calls(),
        vec![("champ".to_string(), 7), ("champ".to_string(), 7)]
    );
}

#[tokio::test]
async fn test_reopen_always_rearms_at_confirm() {
    let (mut dialog, store) = workflow();
    store.set_failing(true);

    dialog.open(3);
    dialog.confirm(true);
    dialog.submit_username("fighter").await;
    assert!(dialog.error().is_some());

    // A new session ending reopens fresh, regardless of prior state
    dialog.open(9);
    assert_eq!(dialog.step(), DialogStep::Confirm);
    assert_eq!(dialog.final_score(), 9);
    assert_eq!(dialog.username(), "");
    assert!(dialog.error().is_none());
}

#[tokio::test]
async fn test_submit_outside_the_username_step_is_rejected() {
    let (mut dialog, store) = workflow();

    // Closed dialog
    assert_eq!(dialog.submit_username("abc").await, SubmitOutcome::Rejected);

    // Confirmation step
    dialog.open(4);
    assert_eq!(dialog.submit_username("abc").await, SubmitOutcome::Rejected);

    assert!(store.calls().is_empty());
}

#[test]
fn test_leaderboard_flag_round_trip() {
    assert_eq!(landing::with_leaderboard_flag("/"), "/?leaderboard=open");
    assert_eq!(
        landing::with_leaderboard_flag("/landing?ref=share"),
        "/landing?ref=share&leaderboard=open"
    );

    assert!(landing::should_open_leaderboard("leaderboard=open"));
    assert!(landing::should_open_leaderboard("ref=share&leaderboard=open"));
    assert!(!landing::should_open_leaderboard("leaderboard=closed"));
    assert!(!landing::should_open_leaderboard(""));
    assert!(!landing::should_open_leaderboard("ref=leaderboard"));
}
