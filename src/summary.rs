//! Summary Views
//!
//! Per-user counts of introduction records, partitioned by direction
//! (sent vs received) and status.

use crate::record::{IntroStatus, IntroductionRecord};
use serde::{Deserialize, Serialize};

/// Counts of a user's introduction records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub user_id: String,
    pub pending_sent: usize,
    pub pending_received: usize,
    pub accepted_sent: usize,
    pub accepted_received: usize,
    pub declined_sent: usize,
    pub declined_received: usize,
}

impl Summary {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Self::default()
        }
    }

    /// Count one record. Records not involving the user are ignored.
    pub fn tally(&mut self, record: &IntroductionRecord) {
        if record.from_user_id == self.user_id {
            match record.status {
                IntroStatus::ProposalSent => self.pending_sent += 1,
                IntroStatus::Accepted => self.accepted_sent += 1,
                IntroStatus::Declined => self.declined_sent += 1,
            }
        } else if record.to_user_id == self.user_id {
            match record.status {
                IntroStatus::ProposalSent => self.pending_received += 1,
                IntroStatus::Accepted => self.accepted_received += 1,
                IntroStatus::Declined => self.declined_received += 1,
            }
        }
    }

    /// Accepted introductions in either direction
    pub fn successful_connections(&self) -> usize {
        self.accepted_sent + self.accepted_received
    }

    pub fn total_sent(&self) -> usize {
        self.pending_sent + self.accepted_sent + self.declined_sent
    }

    pub fn total_received(&self) -> usize {
        self.pending_received + self.accepted_received + self.declined_received
    }

    pub fn pending(&self) -> usize {
        self.pending_sent + self.pending_received
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Decision;
    use chrono::Utc;

    fn record(from: &str, to: &str) -> IntroductionRecord {
        let created_at = Utc::now();
        let id = crate::record::derive_record_id(from, to, created_at, 0);
        IntroductionRecord::new(id, from, to, "hello", created_at)
    }

    #[test]
    fn test_empty_summary_is_all_zero() {
        let summary = Summary::new("u1");
        assert_eq!(summary.pending(), 0);
        assert_eq!(summary.total_sent(), 0);
        assert_eq!(summary.total_received(), 0);
        assert_eq!(summary.successful_connections(), 0);
    }

    #[test]
    fn test_tally_partitions_by_direction() {
        let mut summary = Summary::new("u1");
        summary.tally(&record("u1", "u2"));
        summary.tally(&record("u3", "u1"));
        assert_eq!(summary.pending_sent, 1);
        assert_eq!(summary.pending_received, 1);
        assert_eq!(summary.total_sent(), 1);
        assert_eq!(summary.total_received(), 1);
    }

    #[test]
    fn test_tally_partitions_by_status() {
        let mut summary = Summary::new("u1");
        let mut accepted = record("u1", "u2");
        accepted.resolve(Decision::Accept, Utc::now());
        let mut declined = record("u4", "u1");
        declined.resolve(Decision::Decline, Utc::now());
        summary.tally(&accepted);
        summary.tally(&declined);
        summary.tally(&record("u1", "u5"));
        assert_eq!(summary.accepted_sent, 1);
        assert_eq!(summary.declined_received, 1);
        assert_eq!(summary.pending_sent, 1);
        assert_eq!(summary.successful_connections(), 1);
    }

    #[test]
    fn test_tally_ignores_unrelated_records() {
        let mut summary = Summary::new("u1");
        summary.tally(&record("u2", "u3"));
        assert_eq!(summary, Summary::new("u1"));
    }
}
