//! End-to-end proposal lifecycle over the sled-backed store.

use rapport::error::TrackerError;
use rapport::record::{Decision, IntroStatus};
use rapport::store::SledStore;
use rapport::tracker::IntroductionTracker;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn proposal_lifecycle_survives_reopen() {
    let temp = TempDir::new().unwrap();

    let record_id = {
        let store = Arc::new(SledStore::open(temp.path()).unwrap());
        let tracker = IntroductionTracker::new(store.clone());
        let id = tracker.create_proposal("u1", "u2", "match?").unwrap();
        tracker.resolve_proposal(&id, Decision::Accept).unwrap();
        store.flush().unwrap();
        id
    };

    let store = Arc::new(SledStore::open(temp.path()).unwrap());
    let tracker = IntroductionTracker::new(store);

    let record = tracker.get(&record_id).unwrap();
    assert_eq!(record.status, IntroStatus::Accepted);
    assert!(record.resolved_at.is_some());
    assert_eq!(record.introduction_message, "match?");

    let summary = tracker.summarize("u1").unwrap();
    assert_eq!(summary.accepted_sent, 1);
    assert_eq!(summary.pending_sent, 0);
}

#[test]
fn terminal_records_stay_fixed_across_reopen() {
    let temp = TempDir::new().unwrap();

    let record_id = {
        let store = Arc::new(SledStore::open(temp.path()).unwrap());
        let tracker = IntroductionTracker::new(store.clone());
        let id = tracker.create_proposal("u1", "u2", "hello").unwrap();
        tracker.resolve_proposal(&id, Decision::Decline).unwrap();
        store.flush().unwrap();
        id
    };

    let store = Arc::new(SledStore::open(temp.path()).unwrap());
    let tracker = IntroductionTracker::new(store);

    let err = tracker
        .resolve_proposal(&record_id, Decision::Accept)
        .unwrap_err();
    assert!(matches!(
        err,
        TrackerError::InvalidTransition {
            status: IntroStatus::Declined,
            ..
        }
    ));
    assert_eq!(tracker.get(&record_id).unwrap().status, IntroStatus::Declined);
}

#[test]
fn history_accumulates_without_deletion() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(SledStore::open(temp.path()).unwrap());
    let tracker = IntroductionTracker::new(store);

    let a = tracker.create_proposal("u1", "u2", "first").unwrap();
    let b = tracker.create_proposal("u1", "u3", "second").unwrap();
    let c = tracker.create_proposal("u4", "u1", "third").unwrap();

    tracker.resolve_proposal(&a, Decision::Accept).unwrap();
    tracker.resolve_proposal(&b, Decision::Decline).unwrap();

    let summary = tracker.summarize("u1").unwrap();
    assert_eq!(summary.accepted_sent, 1);
    assert_eq!(summary.declined_sent, 1);
    assert_eq!(summary.pending_received, 1);
    assert_eq!(summary.total_sent(), 2);
    assert_eq!(summary.total_received(), 1);

    // Resolved records remain fetchable; nothing was deleted
    for id in [&a, &b, &c] {
        assert!(tracker.get(id).is_ok());
    }
}
