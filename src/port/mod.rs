//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!            ┌───────────────────────────┐
//!            │        Application        │
//!            │  BetLedger, Settlement,   │
//!            │  Rankings, Scheduler      │
//!            └─────────────┬─────────────┘
//!                          │ LedgerStore / LedgerTx / LedgerView
//!                          ▼
//!                  ┌───────────────┐
//!                  │ SQLite Ledger │
//!                  └───────────────┘
//! ```

pub mod outbound;

pub use outbound::ledger::{LedgerStore, LedgerTx, LedgerView};
