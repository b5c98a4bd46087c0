//! Sled-backed store adapter
//!
//! Trees:
//! - `introductions`: record_id -> bincode-encoded record
//! - `intro_index`: `{user_id}\0{record_id}` -> record_id, one entry per
//!   party, scanned by prefix for `involving` queries
//! - `connections`: connection_id -> bincode-encoded connection
//! - `accounts`: user_id -> bincode-encoded account

use crate::connection::Connection;
use crate::error::StorageError;
use crate::ledger::CreditAccount;
use crate::record::IntroductionRecord;
use crate::store::{AccountStore, ConnectionStore, IntroductionStore};
use ::sled::{Db, Tree};
use std::path::Path;

pub struct SledStore {
    db: Db,
    introductions: Tree,
    intro_index: Tree,
    connections: Tree,
    accounts: Tree,
}

impl SledStore {
    /// Open (or create) the store at the given directory
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let db = ::sled::open(path)?;
        let introductions = db.open_tree("introductions")?;
        let intro_index = db.open_tree("intro_index")?;
        let connections = db.open_tree("connections")?;
        let accounts = db.open_tree("accounts")?;
        Ok(Self {
            db,
            introductions,
            intro_index,
            connections,
            accounts,
        })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    // User ids come from host platforms and never contain NUL, so it is a
    // safe separator for prefix scans.
    fn index_key(user_id: &str, record_id: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(user_id.len() + record_id.len() + 1);
        key.extend_from_slice(user_id.as_bytes());
        key.push(0);
        key.extend_from_slice(record_id.as_bytes());
        key
    }
}

impl IntroductionStore for SledStore {
    fn get(&self, record_id: &str) -> Result<Option<IntroductionRecord>, StorageError> {
        match self.introductions.get(record_id.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, record: &IntroductionRecord) -> Result<(), StorageError> {
        let bytes = bincode::serialize(record)?;
        self.introductions
            .insert(record.record_id.as_bytes(), bytes)?;
        for user_id in [&record.from_user_id, &record.to_user_id] {
            self.intro_index.insert(
                Self::index_key(user_id, &record.record_id),
                record.record_id.as_bytes(),
            )?;
        }
        Ok(())
    }

    fn involving(&self, user_id: &str) -> Result<Vec<IntroductionRecord>, StorageError> {
        let mut prefix = user_id.as_bytes().to_vec();
        prefix.push(0);

        let mut records = Vec::new();
        for entry in self.intro_index.scan_prefix(&prefix) {
            let (_key, record_id) = entry?;
            if let Some(bytes) = self.introductions.get(&record_id)? {
                records.push(bincode::deserialize(&bytes)?);
            }
        }
        records.sort_by_key(|record: &IntroductionRecord| record.created_at);
        Ok(records)
    }
}

impl ConnectionStore for SledStore {
    fn get(&self, connection_id: &str) -> Result<Option<Connection>, StorageError> {
        match self.connections.get(connection_id.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, connection: &Connection) -> Result<(), StorageError> {
        let bytes = bincode::serialize(connection)?;
        self.connections
            .insert(connection.connection_id.as_bytes(), bytes)?;
        Ok(())
    }
}

impl AccountStore for SledStore {
    fn get(&self, user_id: &str) -> Result<Option<CreditAccount>, StorageError> {
        match self.accounts.get(user_id.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, account: &CreditAccount) -> Result<(), StorageError> {
        let bytes = bincode::serialize(account)?;
        self.accounts.insert(account.user_id.as_bytes(), bytes)?;
        Ok(())
    }
}
