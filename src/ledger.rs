//! Credit Ledger
//!
//! Per-user credit accounts with an initial grant at registration and a
//! rolling daily allowance. Balances fund connection escrows and receive
//! unlock rewards.

use crate::error::TrackerError;
use crate::store::AccountStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

const DAY_IN_SECONDS: i64 = 86_400;

/// Ledger amounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Credits granted once at registration
    #[serde(default = "default_initial_grant")]
    pub initial_grant: u64,

    /// Maximum credits claimable per 24-hour window
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u64,
}

fn default_initial_grant() -> u64 {
    48
}

fn default_daily_limit() -> u64 {
    24
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_grant: default_initial_grant(),
            daily_limit: default_daily_limit(),
        }
    }
}

/// A user's credit account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAccount {
    pub user_id: String,
    pub balance: u64,
    /// Credits granted inside the current 24-hour window
    pub granted_today: u64,
    pub last_grant_at: DateTime<Utc>,
    pub total_granted: u64,
}

impl CreditAccount {
    fn empty(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            balance: 0,
            granted_today: 0,
            last_grant_at: now,
            total_granted: 0,
        }
    }
}

pub struct CreditLedger {
    store: Arc<dyn AccountStore>,
    config: LedgerConfig,
}

impl CreditLedger {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self::with_config(store, LedgerConfig::default())
    }

    pub fn with_config(store: Arc<dyn AccountStore>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Create the user's account with the initial grant.
    ///
    /// The initial grant counts against the current day, so `claim_daily`
    /// only starts paying out after the first rollover.
    pub fn register(&self, user_id: &str) -> Result<CreditAccount, TrackerError> {
        if self.store.get(user_id)?.is_some() {
            return Err(TrackerError::AlreadyRegistered(user_id.to_string()));
        }

        let account = CreditAccount {
            user_id: user_id.to_string(),
            balance: self.config.initial_grant,
            granted_today: self.config.initial_grant,
            last_grant_at: Utc::now(),
            total_granted: self.config.initial_grant,
        };
        self.store.put(&account)?;

        info!(
            user_id = %user_id,
            initial_grant = self.config.initial_grant,
            "Registered credit account"
        );
        Ok(account)
    }

    /// Claim the remaining daily allowance. The window resets 24 hours after
    /// the last grant.
    pub fn claim_daily(&self, user_id: &str) -> Result<u64, TrackerError> {
        let mut account = self
            .store
            .get(user_id)?
            .ok_or_else(|| TrackerError::AccountNotFound(user_id.to_string()))?;

        let now = Utc::now();
        let elapsed = now.signed_duration_since(account.last_grant_at).num_seconds();
        if elapsed / DAY_IN_SECONDS > 0 {
            account.granted_today = 0;
            account.last_grant_at = now;
        }

        if account.granted_today >= self.config.daily_limit {
            return Err(TrackerError::DailyLimitReached(user_id.to_string()));
        }

        let amount = self.config.daily_limit - account.granted_today;
        account.balance += amount;
        account.granted_today += amount;
        account.total_granted += amount;
        self.store.put(&account)?;

        info!(
            user_id = %user_id,
            amount,
            total_granted = account.total_granted,
            "Granted daily credits"
        );
        Ok(amount)
    }

    /// Move credits between accounts. The destination is created lazily
    /// (escrow accounts are only ever credited this way).
    pub fn transfer(&self, from: &str, to: &str, amount: u64) -> Result<(), TrackerError> {
        let mut source = self
            .store
            .get(from)?
            .ok_or_else(|| TrackerError::AccountNotFound(from.to_string()))?;

        if source.balance < amount {
            return Err(TrackerError::InsufficientCredit {
                user_id: from.to_string(),
                balance: source.balance,
                required: amount,
            });
        }
        source.balance -= amount;

        let mut destination = self
            .store
            .get(to)?
            .unwrap_or_else(|| CreditAccount::empty(to, Utc::now()));
        destination.balance += amount;

        self.store.put(&source)?;
        self.store.put(&destination)?;

        debug!(from = %from, to = %to, amount, "Transferred credits");
        Ok(())
    }

    /// Grant credits outside the daily allowance (unlock rewards). Creates
    /// the account lazily.
    pub fn credit(&self, user_id: &str, amount: u64) -> Result<(), TrackerError> {
        let mut account = self
            .store
            .get(user_id)?
            .unwrap_or_else(|| CreditAccount::empty(user_id, Utc::now()));
        account.balance += amount;
        self.store.put(&account)?;

        debug!(user_id = %user_id, amount, "Credited reward");
        Ok(())
    }

    pub fn balance(&self, user_id: &str) -> Result<u64, TrackerError> {
        Ok(self.account(user_id)?.balance)
    }

    pub fn account(&self, user_id: &str) -> Result<CreditAccount, TrackerError> {
        self.store
            .get(user_id)?
            .ok_or_else(|| TrackerError::AccountNotFound(user_id.to_string()))
    }
}
