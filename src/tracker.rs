//! Introduction Lifecycle Tracker
//!
//! Creates proposals, applies accept/decline resolutions, and builds per-user
//! summaries. A flat read-then-write layer over the store port: persistence
//! failures surface upward, nothing is retried, and records are never
//! deleted.

use crate::concurrency::RecordLockManager;
use crate::error::TrackerError;
use crate::record::{derive_record_id, Decision, IntroductionRecord};
use crate::store::IntroductionStore;
use crate::summary::Summary;
use crate::types::RecordId;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

pub struct IntroductionTracker {
    store: Arc<dyn IntroductionStore>,
    locks: RecordLockManager,
    /// Keeps ids distinct when proposals for the same pair land in the same
    /// clock tick
    seq: AtomicU64,
}

impl IntroductionTracker {
    pub fn new(store: Arc<dyn IntroductionStore>) -> Self {
        Self {
            store,
            locks: RecordLockManager::new(),
            seq: AtomicU64::new(0),
        }
    }

    /// Insert a new record with status `proposal_sent`.
    ///
    /// Not idempotent: every call creates a fresh record, duplicates
    /// included.
    pub fn create_proposal(
        &self,
        from_user_id: &str,
        to_user_id: &str,
        message: &str,
    ) -> Result<RecordId, TrackerError> {
        if from_user_id.trim().is_empty() || to_user_id.trim().is_empty() {
            return Err(TrackerError::InvalidProposal(
                "user identifiers must be non-empty".to_string(),
            ));
        }
        if from_user_id == to_user_id {
            return Err(TrackerError::InvalidProposal(format!(
                "cannot introduce {} to themselves",
                from_user_id
            )));
        }

        let created_at = Utc::now();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let record_id = derive_record_id(from_user_id, to_user_id, created_at, seq);
        let record = IntroductionRecord::new(
            record_id.clone(),
            from_user_id,
            to_user_id,
            message,
            created_at,
        );
        self.store.put(&record)?;

        info!(
            record_id = %record_id,
            from = %from_user_id,
            to = %to_user_id,
            "Created introduction proposal"
        );
        Ok(record_id)
    }

    /// Apply the recipient's decision to a pending proposal.
    ///
    /// Fails with `InvalidTransition` if the record is already terminal and
    /// leaves it unchanged.
    pub fn resolve_proposal(
        &self,
        record_id: &str,
        decision: Decision,
    ) -> Result<(), TrackerError> {
        let lock = self.locks.get_lock(record_id);
        let _guard = lock.write();

        let mut record = self
            .store
            .get(record_id)?
            .ok_or_else(|| TrackerError::NotFound(record_id.to_string()))?;

        if record.is_terminal() {
            return Err(TrackerError::InvalidTransition {
                record_id: record_id.to_string(),
                status: record.status,
            });
        }

        record.resolve(decision, Utc::now());
        self.store.put(&record)?;

        info!(
            record_id = %record_id,
            status = %record.status,
            "Resolved introduction proposal"
        );
        Ok(())
    }

    /// Fetch a record by id
    pub fn get(&self, record_id: &str) -> Result<IntroductionRecord, TrackerError> {
        self.store
            .get(record_id)?
            .ok_or_else(|| TrackerError::NotFound(record_id.to_string()))
    }

    /// Counts of the user's records, partitioned by direction and status.
    /// Users with no records get all-zero counts.
    pub fn summarize(&self, user_id: &str) -> Result<Summary, TrackerError> {
        let mut summary = Summary::new(user_id);
        for record in self.store.involving(user_id)? {
            summary.tally(&record);
        }
        debug!(
            user_id = %user_id,
            pending = summary.pending(),
            accepted = summary.successful_connections(),
            "Built introduction summary"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::IntroStatus;
    use crate::store::MemoryStore;

    fn tracker() -> IntroductionTracker {
        IntroductionTracker::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_create_proposal_is_pending_with_timestamp() {
        let tracker = tracker();
        let id = tracker.create_proposal("u1", "u2", "match?").unwrap();
        let record = tracker.get(&id).unwrap();
        assert_eq!(record.status, IntroStatus::ProposalSent);
        assert_eq!(record.introduction_message, "match?");
        assert!(record.created_at <= Utc::now());
        assert!(record.resolved_at.is_none());
    }

    #[test]
    fn test_create_proposal_rejects_empty_and_self() {
        let tracker = tracker();
        assert!(matches!(
            tracker.create_proposal("", "u2", "hi"),
            Err(TrackerError::InvalidProposal(_))
        ));
        assert!(matches!(
            tracker.create_proposal("u1", "  ", "hi"),
            Err(TrackerError::InvalidProposal(_))
        ));
        assert!(matches!(
            tracker.create_proposal("u1", "u1", "hi"),
            Err(TrackerError::InvalidProposal(_))
        ));
    }

    #[test]
    fn test_accept_moves_pending_to_accepted_for_both_parties() {
        let tracker = tracker();
        let id = tracker.create_proposal("u1", "u2", "match?").unwrap();

        assert_eq!(tracker.summarize("u2").unwrap().pending_received, 1);
        assert_eq!(tracker.summarize("u1").unwrap().pending_sent, 1);

        tracker.resolve_proposal(&id, Decision::Accept).unwrap();

        let from_summary = tracker.summarize("u1").unwrap();
        assert_eq!(from_summary.pending_sent, 0);
        assert_eq!(from_summary.accepted_sent, 1);
        assert_eq!(from_summary.successful_connections(), 1);

        let to_summary = tracker.summarize("u2").unwrap();
        assert_eq!(to_summary.pending_received, 0);
        assert_eq!(to_summary.accepted_received, 1);
        assert_eq!(to_summary.successful_connections(), 1);
    }

    #[test]
    fn test_decline_is_terminal_but_not_successful() {
        let tracker = tracker();
        let id = tracker.create_proposal("u1", "u2", "match?").unwrap();
        tracker.resolve_proposal(&id, Decision::Decline).unwrap();

        let summary = tracker.summarize("u1").unwrap();
        assert_eq!(summary.declined_sent, 1);
        assert_eq!(summary.successful_connections(), 0);
    }

    #[test]
    fn test_resolve_terminal_record_fails_and_leaves_state_unchanged() {
        let tracker = tracker();
        let id = tracker.create_proposal("u1", "u2", "match?").unwrap();
        tracker.resolve_proposal(&id, Decision::Accept).unwrap();

        let before = tracker.get(&id).unwrap();
        let err = tracker.resolve_proposal(&id, Decision::Decline).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InvalidTransition {
                status: IntroStatus::Accepted,
                ..
            }
        ));
        assert_eq!(tracker.get(&id).unwrap(), before);
    }

    #[test]
    fn test_resolve_unknown_record_is_not_found() {
        let tracker = tracker();
        assert!(matches!(
            tracker.resolve_proposal("missing", Decision::Accept),
            Err(TrackerError::NotFound(_))
        ));
    }

    #[test]
    fn test_summarize_unknown_user_is_all_zero() {
        let tracker = tracker();
        tracker.create_proposal("u1", "u2", "hi").unwrap();
        let summary = tracker.summarize("nobody").unwrap();
        assert_eq!(summary.pending(), 0);
        assert_eq!(summary.total_sent(), 0);
        assert_eq!(summary.total_received(), 0);
    }

    #[test]
    fn test_duplicate_proposals_create_distinct_records() {
        let tracker = tracker();
        let a = tracker.create_proposal("u1", "u2", "hi").unwrap();
        let b = tracker.create_proposal("u1", "u2", "hi").unwrap();
        assert_ne!(a, b);
        assert_eq!(tracker.summarize("u2").unwrap().pending_received, 2);
    }
}
