//! Adapters connecting the wagering core to the outside world.
//!
//! - [`inbound`] - The `wagerbook` CLI
//! - [`outbound`] - The SQLite ledger store

pub mod inbound;
pub mod outbound;
