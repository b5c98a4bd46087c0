//! Concurrent access safety for resolution operations
//!
//! Per-record locking so concurrent resolution attempts cannot produce lost
//! updates or a second terminal transition. Reads don't take locks; the
//! read-then-write sequence in resolution does.

use crate::types::RecordId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-record lock manager
///
/// Fine-grained locking at the record level, so resolutions of different
/// records proceed concurrently while resolutions of the same record
/// serialize.
pub struct RecordLockManager {
    locks: Arc<RwLock<HashMap<RecordId, Arc<RwLock<()>>>>>,
}

impl RecordLockManager {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get or create the lock for a record
    ///
    /// Returns an Arc to the record's lock, which can be used to acquire
    /// read or write guards.
    pub fn get_lock(&self, record_id: &str) -> Arc<RwLock<()>> {
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(record_id) {
                return lock.clone();
            }
        }

        // Double-check after acquiring the write lock: another thread might
        // have created the entry in between.
        let mut map = self.locks.write();
        map.entry(record_id.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }
}

impl Default for RecordLockManager {
    fn default() -> Self {
        Self::new()
    }
}
