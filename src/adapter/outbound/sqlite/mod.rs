//! SQLite persistence adapters.
//!
//! Provides the SQLite-backed ledger store using Diesel ORM.

pub mod database;
pub mod ledger;

pub use database::connection::PoolOptions;
pub use ledger::{SqliteLedger, SqliteLedgerTx};
