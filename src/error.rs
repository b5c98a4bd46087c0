//! Error types for the tracker, connection, and ledger surfaces.
//!
//! `StorageError` covers the persistence layer; `TrackerError` is the flat
//! error surface callers see. Persistence failures are surfaced upward and
//! never retried here.

use crate::record::IntroStatus;
use crate::types::RecordId;
use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store could not be reached or failed an operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A record could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Unavailable(err.to_string())
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// API surface errors
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Introduction not found: {0}")]
    NotFound(RecordId),

    #[error("Invalid transition: introduction {record_id} is already {status}")]
    InvalidTransition {
        record_id: RecordId,
        status: IntroStatus,
    },

    #[error("Invalid proposal: {0}")]
    InvalidProposal(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Connection already exists: {0}")]
    ConnectionExists(String),

    #[error("Invalid PIN provided")]
    InvalidPin,

    #[error("User {user_id} has already unlocked connection {connection_id}")]
    AlreadyUnlocked {
        connection_id: String,
        user_id: String,
    },

    #[error("User {user_id} is not a party to connection {connection_id}")]
    UnauthorizedUser {
        connection_id: String,
        user_id: String,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Daily credit limit reached for {0}")]
    DailyLimitReached(String),

    #[error("Insufficient credit: {user_id} has {balance}, needs {required}")]
    InsufficientCredit {
        user_id: String,
        balance: u64,
        required: u64,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
