//! Rapport: Introduction Lifecycle Tracking
//!
//! Records proposed introductions between two parties, tracks their
//! accept/decline resolution, and answers per-user pending/summary queries.
//! Supporting services cover PIN-verified connection unlocks and the credit
//! ledger that funds them.

pub mod concurrency;
pub mod config;
pub mod connection;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod logging;
pub mod record;
pub mod store;
pub mod summary;
pub mod tracker;
pub mod types;
