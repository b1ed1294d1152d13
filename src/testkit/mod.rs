//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`ledger`]: [`TempLedger`](ledger::TempLedger), a file-backed SQLite
//!   ledger deleted on drop, plus seeding helpers.
//! - [`domain`]: Builders for listings and ids.
//! - [`faulty`]: A store wrapper that fails a chosen step inside a unit.

pub mod domain;
pub mod faulty;
pub mod ledger;
