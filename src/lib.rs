//! Wagerbook - play-money prediction market wagering ledger.
//!
//! Users stake credits on event outcomes at odds locked when the bet is
//! placed. Stakes sit in escrow until the event resolves; settlement then
//! pays winners, closes losers and refreshes the leaderboards, exactly once
//! per event.
//!
//! # Architecture
//!
//! - [`domain`] - Users, events, bets, settlements, ledger entries, rankings
//! - [`port`] - The ledger store traits the services are written against
//! - [`application`] - Bet placement, settlement, ranking, accounts, ingestion
//!   and the settlement scheduler
//! - [`adapter`] - SQLite ledger (diesel) and the `wagerbook` CLI
//! - [`infrastructure`] - Configuration, service wiring, daemon lifecycle
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use wagerbook::domain::{EventId, UserId};
//! use wagerbook::infrastructure::bootstrap::build_services;
//! use wagerbook::infrastructure::config::settings::Config;
//!
//! fn main() -> wagerbook::error::Result<()> {
//!     let config = Config::load_or_default("config.toml")?;
//!     let services = build_services(&config)?;
//!     let user = UserId::new("alice");
//!     services.accounts.open_account(&user, "Alice")?;
//!     services
//!         .bets
//!         .place_bet(&user, &EventId::new("rain-tomorrow"), "yes", 100)?;
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
