//! Introduction Records
//!
//! Append-only records of proposed introductions between two parties.
//! A record is created as `proposal_sent` and transitions at most once to a
//! terminal status; nothing mutates it afterwards and nothing deletes it.

use crate::types::{RecordId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an introduction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroStatus {
    ProposalSent,
    Accepted,
    Declined,
}

impl IntroStatus {
    /// Terminal statuses permit no further transition
    pub fn is_terminal(&self) -> bool {
        !matches!(self, IntroStatus::ProposalSent)
    }
}

impl std::fmt::Display for IntroStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IntroStatus::ProposalSent => "proposal_sent",
            IntroStatus::Accepted => "accepted",
            IntroStatus::Declined => "declined",
        };
        f.write_str(s)
    }
}

/// Recipient decision on a pending proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Decline,
}

impl Decision {
    pub fn status(&self) -> IntroStatus {
        match self {
            Decision::Accept => IntroStatus::Accepted,
            Decision::Decline => IntroStatus::Declined,
        }
    }
}

/// A proposed introduction and its resolution state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroductionRecord {
    pub record_id: RecordId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub status: IntroStatus,
    /// Free text shown to the recipient
    pub introduction_message: String,
    /// Set at creation, immutable afterwards
    pub created_at: DateTime<Utc>,
    /// Set once, on the terminal transition
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl IntroductionRecord {
    pub fn new(
        record_id: RecordId,
        from_user_id: &str,
        to_user_id: &str,
        introduction_message: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id,
            from_user_id: from_user_id.to_string(),
            to_user_id: to_user_id.to_string(),
            status: IntroStatus::ProposalSent,
            introduction_message: introduction_message.to_string(),
            created_at,
            resolved_at: None,
        }
    }

    /// Whether the user is either party to this introduction
    pub fn involves(&self, user_id: &str) -> bool {
        self.from_user_id == user_id || self.to_user_id == user_id
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply the terminal transition. Callers must have checked that the
    /// record is still pending.
    pub(crate) fn resolve(&mut self, decision: Decision, at: DateTime<Utc>) {
        self.status = decision.status();
        self.resolved_at = Some(at);
    }
}

/// Derive a content-based record id from the proposal fields.
///
/// Creation is not idempotent: the sequence number keeps repeated proposals
/// for the same pair distinct.
pub fn derive_record_id(
    from_user_id: &str,
    to_user_id: &str,
    created_at: DateTime<Utc>,
    seq: u64,
) -> RecordId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(from_user_id.as_bytes());
    hasher.update(&[0]);
    hasher.update(to_user_id.as_bytes());
    hasher.update(&[0]);
    hasher.update(
        &created_at
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes(),
    );
    hasher.update(&seq.to_le_bytes());
    hex::encode(hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> IntroductionRecord {
        let created_at = Utc::now();
        let id = derive_record_id("u1", "u2", created_at, 0);
        IntroductionRecord::new(id, "u1", "u2", "match?", created_at)
    }

    #[test]
    fn test_new_record_is_pending() {
        let record = record();
        assert_eq!(record.status, IntroStatus::ProposalSent);
        assert!(!record.is_terminal());
        assert!(record.resolved_at.is_none());
    }

    #[test]
    fn test_involves_both_parties() {
        let record = record();
        assert!(record.involves("u1"));
        assert!(record.involves("u2"));
        assert!(!record.involves("u3"));
    }

    #[test]
    fn test_resolve_sets_terminal_status() {
        let mut record = record();
        let at = Utc::now();
        record.resolve(Decision::Accept, at);
        assert_eq!(record.status, IntroStatus::Accepted);
        assert_eq!(record.resolved_at, Some(at));
        assert!(record.is_terminal());

        let mut record = self::record();
        record.resolve(Decision::Decline, at);
        assert_eq!(record.status, IntroStatus::Declined);
    }

    #[test]
    fn test_status_wire_format_is_snake_case() {
        let json = serde_json::to_string(&IntroStatus::ProposalSent).unwrap();
        assert_eq!(json, "\"proposal_sent\"");
        let json = serde_json::to_string(&IntroStatus::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");
        let json = serde_json::to_string(&IntroStatus::Declined).unwrap();
        assert_eq!(json, "\"declined\"");
    }

    #[test]
    fn test_record_ids_differ_per_sequence() {
        let created_at = Utc::now();
        let a = derive_record_id("u1", "u2", created_at, 0);
        let b = derive_record_id("u1", "u2", created_at, 1);
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }
}
