//! Record Stores
//!
//! Port traits for the persistence layer plus adapters. Services hold
//! explicit store handles passed in at construction; nothing in this crate
//! keeps process-global state.

pub mod memory;
pub mod sled;

pub use self::memory::MemoryStore;
pub use self::sled::SledStore;

use crate::connection::Connection;
use crate::error::StorageError;
use crate::ledger::CreditAccount;
use crate::record::IntroductionRecord;

/// Introduction record store interface
///
/// `involving` returns every record where the user is either party, ordered
/// by creation time.
pub trait IntroductionStore: Send + Sync {
    fn get(&self, record_id: &str) -> Result<Option<IntroductionRecord>, StorageError>;
    fn put(&self, record: &IntroductionRecord) -> Result<(), StorageError>;
    fn involving(&self, user_id: &str) -> Result<Vec<IntroductionRecord>, StorageError>;
}

/// Connection record store interface
pub trait ConnectionStore: Send + Sync {
    fn get(&self, connection_id: &str) -> Result<Option<Connection>, StorageError>;
    fn put(&self, connection: &Connection) -> Result<(), StorageError>;
}

/// Credit account store interface
pub trait AccountStore: Send + Sync {
    fn get(&self, user_id: &str) -> Result<Option<CreditAccount>, StorageError>;
    fn put(&self, account: &CreditAccount) -> Result<(), StorageError>;
}
