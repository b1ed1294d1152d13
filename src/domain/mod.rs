//! Store-agnostic wagering domain.

pub mod bet;
pub mod event;
pub mod id;
pub mod money;
pub mod ranking;
pub mod settlement;
pub mod stats;
pub mod transaction;
pub mod user;

pub use bet::{Bet, BetStatus};
pub use event::{detect_resolution, Event, EventListing, EventStatus};
pub use id::{BetId, EventId, UserId};
pub use money::{Credits, Odds};
pub use ranking::{Ranking, RankingPeriod};
pub use settlement::Settlement;
pub use stats::DashboardStats;
pub use transaction::{CreditTransaction, LedgerAudit, NewCreditTransaction, TransactionKind};
pub use user::User;
