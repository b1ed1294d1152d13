//! Application services (use cases).
//!
//! These services orchestrate domain logic against the ledger port to
//! implement bet placement, settlement, ranking and the ingestion contract.

pub mod account;
pub mod bet;
pub mod ingest;
pub mod ranking;
pub mod scheduler;
pub mod settlement;

pub use account::AccountService;
pub use bet::BetLedger;
pub use ingest::{EventFeed, PublishOutcome};
pub use ranking::{RankingCalculator, RankingPolicy, RankingSummary};
pub use scheduler::{SchedulerConfig, SchedulerHandle, SettlementScheduler};
pub use settlement::{SettleOutcome, SettlementEngine, SweepFailure, SweepReport};
