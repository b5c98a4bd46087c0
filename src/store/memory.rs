//! In-memory store adapter
//!
//! Backs all three store ports with `RwLock`-guarded maps. Used by tests and
//! by hosts that don't need persistence across restarts.

use crate::connection::Connection;
use crate::error::StorageError;
use crate::ledger::CreditAccount;
use crate::record::IntroductionRecord;
use crate::store::{AccountStore, ConnectionStore, IntroductionStore};
use crate::types::RecordId;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryStore {
    introductions: RwLock<HashMap<RecordId, IntroductionRecord>>,
    connections: RwLock<HashMap<String, Connection>>,
    accounts: RwLock<HashMap<String, CreditAccount>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IntroductionStore for MemoryStore {
    fn get(&self, record_id: &str) -> Result<Option<IntroductionRecord>, StorageError> {
        Ok(self.introductions.read().get(record_id).cloned())
    }

    fn put(&self, record: &IntroductionRecord) -> Result<(), StorageError> {
        self.introductions
            .write()
            .insert(record.record_id.clone(), record.clone());
        Ok(())
    }

    fn involving(&self, user_id: &str) -> Result<Vec<IntroductionRecord>, StorageError> {
        let mut records: Vec<IntroductionRecord> = self
            .introductions
            .read()
            .values()
            .filter(|record| record.involves(user_id))
            .cloned()
            .collect();
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }
}

impl ConnectionStore for MemoryStore {
    fn get(&self, connection_id: &str) -> Result<Option<Connection>, StorageError> {
        Ok(self.connections.read().get(connection_id).cloned())
    }

    fn put(&self, connection: &Connection) -> Result<(), StorageError> {
        self.connections
            .write()
            .insert(connection.connection_id.clone(), connection.clone());
        Ok(())
    }
}

impl AccountStore for MemoryStore {
    fn get(&self, user_id: &str) -> Result<Option<CreditAccount>, StorageError> {
        Ok(self.accounts.read().get(user_id).cloned())
    }

    fn put(&self, account: &CreditAccount) -> Result<(), StorageError> {
        self.accounts
            .write()
            .insert(account.user_id.clone(), account.clone());
        Ok(())
    }
}
