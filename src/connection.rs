//! PIN-Verified Connections
//!
//! After an accepted introduction the two parties exchange PINs out of band;
//! each side unlocks the connection by submitting the OTHER party's PIN.
//! Opening a connection moves a credit lock from the initiator into a
//! per-connection escrow; each successful unlock pays a reward, and once both
//! sides have unlocked the agent account is rewarded as well.

use crate::concurrency::RecordLockManager;
use crate::error::TrackerError;
use crate::ledger::CreditLedger;
use crate::store::ConnectionStore;
use crate::types::PinHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;

/// Connection amounts and the agent reward account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Credits moved into escrow when a connection opens
    #[serde(default = "default_lock_amount")]
    pub lock_amount: u64,

    /// Credits paid per successful unlock
    #[serde(default = "default_reward_amount")]
    pub reward_amount: u64,

    /// Account credited once both sides have unlocked
    #[serde(default = "default_agent_account")]
    pub agent_account: String,
}

fn default_lock_amount() -> u64 {
    24
}

fn default_reward_amount() -> u64 {
    8
}

fn default_agent_account() -> String {
    "agent".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            lock_amount: default_lock_amount(),
            reward_amount: default_reward_amount(),
            agent_account: default_agent_account(),
        }
    }
}

/// A connection between two parties awaiting PIN unlocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub connection_id: String,
    pub user_a_id: String,
    pub user_b_id: String,
    pub pin_a_hash: PinHash,
    pub pin_b_hash: PinHash,
    pub user_a_unlocked: bool,
    pub user_b_unlocked: bool,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    pub fn is_complete(&self) -> bool {
        self.user_a_unlocked && self.user_b_unlocked
    }
}

/// SHA-256 digest of a PIN string. Only hashes are persisted.
pub fn hash_pin(pin: &str) -> PinHash {
    let mut hasher = Sha256::new();
    hasher.update(pin.as_bytes());
    hasher.finalize().into()
}

/// Escrow accounts are scoped per connection
fn escrow_account(connection_id: &str) -> String {
    format!("escrow:{}", connection_id)
}

pub struct ConnectionService {
    store: Arc<dyn ConnectionStore>,
    ledger: CreditLedger,
    locks: RecordLockManager,
    config: ConnectionConfig,
}

impl ConnectionService {
    pub fn new(store: Arc<dyn ConnectionStore>, ledger: CreditLedger) -> Self {
        Self::with_config(store, ledger, ConnectionConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn ConnectionStore>,
        ledger: CreditLedger,
        config: ConnectionConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            locks: RecordLockManager::new(),
            config,
        }
    }

    /// Open a connection, locking credits from user A into escrow.
    ///
    /// Fails with `InsufficientCredit` before any state is written if user A
    /// cannot cover the lock amount.
    pub fn open(
        &self,
        connection_id: &str,
        user_a_id: &str,
        user_b_id: &str,
        pin_a: &str,
        pin_b: &str,
    ) -> Result<Connection, TrackerError> {
        if self.store.get(connection_id)?.is_some() {
            return Err(TrackerError::ConnectionExists(connection_id.to_string()));
        }

        self.ledger
            .transfer(user_a_id, &escrow_account(connection_id), self.config.lock_amount)?;

        let connection = Connection {
            connection_id: connection_id.to_string(),
            user_a_id: user_a_id.to_string(),
            user_b_id: user_b_id.to_string(),
            pin_a_hash: hash_pin(pin_a),
            pin_b_hash: hash_pin(pin_b),
            user_a_unlocked: false,
            user_b_unlocked: false,
            created_at: Utc::now(),
        };
        self.store.put(&connection)?;

        info!(
            connection_id = %connection_id,
            user_a = %user_a_id,
            user_b = %user_b_id,
            locked = self.config.lock_amount,
            "Opened connection with escrow lock"
        );
        Ok(connection)
    }

    /// Submit the other party's PIN to unlock the caller's side.
    ///
    /// Returns `true` once both sides have unlocked, at which point the agent
    /// account receives its reward.
    pub fn unlock(
        &self,
        connection_id: &str,
        user_id: &str,
        submitted_pin: &str,
    ) -> Result<bool, TrackerError> {
        let lock = self.locks.get_lock(connection_id);
        let _guard = lock.write();

        let mut connection = self
            .store
            .get(connection_id)?
            .ok_or_else(|| TrackerError::ConnectionNotFound(connection_id.to_string()))?;

        let submitted_hash = hash_pin(submitted_pin);

        if user_id == connection.user_a_id {
            // User A submits user B's PIN
            if submitted_hash != connection.pin_b_hash {
                return Err(TrackerError::InvalidPin);
            }
            if connection.user_a_unlocked {
                return Err(TrackerError::AlreadyUnlocked {
                    connection_id: connection_id.to_string(),
                    user_id: user_id.to_string(),
                });
            }
            connection.user_a_unlocked = true;
        } else if user_id == connection.user_b_id {
            if submitted_hash != connection.pin_a_hash {
                return Err(TrackerError::InvalidPin);
            }
            if connection.user_b_unlocked {
                return Err(TrackerError::AlreadyUnlocked {
                    connection_id: connection_id.to_string(),
                    user_id: user_id.to_string(),
                });
            }
            connection.user_b_unlocked = true;
        } else {
            return Err(TrackerError::UnauthorizedUser {
                connection_id: connection_id.to_string(),
                user_id: user_id.to_string(),
            });
        }

        self.ledger.credit(user_id, self.config.reward_amount)?;
        info!(
            connection_id = %connection_id,
            user_id = %user_id,
            reward = self.config.reward_amount,
            "Unlocked connection side"
        );

        let complete = connection.is_complete();
        if complete {
            self.ledger
                .credit(&self.config.agent_account, self.config.reward_amount)?;
            info!(
                connection_id = %connection_id,
                agent = %self.config.agent_account,
                "Connection complete, agent rewarded"
            );
        }

        self.store.put(&connection)?;
        Ok(complete)
    }

    pub fn get(&self, connection_id: &str) -> Result<Connection, TrackerError> {
        self.store
            .get(connection_id)?
            .ok_or_else(|| TrackerError::ConnectionNotFound(connection_id.to_string()))
    }
}
