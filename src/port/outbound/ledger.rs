//! Ledger persistence port.
//!
//! The wagering core talks to storage through three traits:
//!
//! - [`LedgerView`] answers read-only queries outside any transaction.
//! - [`LedgerTx`] is the handle available inside an atomic unit. Every read
//!   through it happens under the store's write lock, so a row read here
//!   cannot change until the unit commits or rolls back.
//! - [`LedgerStore`] opens atomic units.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{
    Bet, BetId, BetStatus, CreditTransaction, Credits, DashboardStats, Event, EventId,
    NewCreditTransaction, Ranking, RankingPeriod, Settlement, User, UserId,
};
use crate::error::Result;

/// Operations available inside an atomic unit.
pub trait LedgerTx {
    /// Load a user for modification.
    fn user_for_update(&mut self, id: &UserId) -> Result<Option<User>>;

    fn insert_user(&mut self, user: &User) -> Result<()>;

    /// Persist every mutable column of `user`.
    fn update_user(&mut self, user: &User) -> Result<()>;

    fn event(&mut self, id: &EventId) -> Result<Option<Event>>;

    fn insert_event(&mut self, event: &Event) -> Result<()>;

    /// Persist every mutable column of `event`.
    fn update_event(&mut self, event: &Event) -> Result<()>;

    fn insert_bet(&mut self, bet: &Bet) -> Result<()>;

    /// Persist status, payout and settlement time of `bet`.
    fn update_bet(&mut self, bet: &Bet) -> Result<()>;

    /// Pending bets on `event_id`, oldest first, locked for settlement.
    fn pending_bets_for_event(&mut self, event_id: &EventId) -> Result<Vec<Bet>>;

    fn settlement_exists(&mut self, event_id: &EventId) -> Result<bool>;

    /// Insert a settlement row and return its id.
    fn insert_settlement(&mut self, settlement: &Settlement) -> Result<i64>;

    /// Append a ledger entry and return its id.
    fn append_transaction(&mut self, entry: &NewCreditTransaction) -> Result<i64>;

    /// Users with at least one bet.
    fn users_with_bets(&mut self) -> Result<Vec<User>>;

    /// Number of lost bets per user.
    fn lost_bet_counts(&mut self) -> Result<HashMap<UserId, i64>>;

    /// Won or lost bets settled at or after `since`.
    fn settled_bets_since(&mut self, since: DateTime<Utc>) -> Result<Vec<Bet>>;

    /// Delete every row of `period` and insert `rows` in its place.
    fn replace_rankings(&mut self, period: RankingPeriod, rows: &[Ranking]) -> Result<()>;
}

/// Read-only queries.
pub trait LedgerView: Send + Sync {
    fn user(&self, id: &UserId) -> Result<Option<User>>;

    fn event(&self, id: &EventId) -> Result<Option<Event>>;

    fn bet(&self, id: &BetId) -> Result<Option<Bet>>;

    /// A user's bets, newest first, optionally filtered by status.
    fn bets_for_user(&self, user_id: &UserId, status: Option<BetStatus>) -> Result<Vec<Bet>>;

    /// Sum of the user's pending stakes.
    fn pending_stake(&self, user_id: &UserId) -> Result<Credits>;

    fn settlement_for_event(&self, event_id: &EventId) -> Result<Option<Settlement>>;

    /// Most recent settlements, newest first.
    fn recent_settlements(&self, limit: i64) -> Result<Vec<Settlement>>;

    /// A user's ledger entries in append order.
    fn transactions_for_user(&self, user_id: &UserId) -> Result<Vec<CreditTransaction>>;

    /// Leaderboard rows for `period` by rank position.
    fn rankings(&self, period: RankingPeriod) -> Result<Vec<Ranking>>;

    /// Resolved events with an outcome and no settlement row.
    fn unsettled_resolved_events(&self) -> Result<Vec<Event>>;

    fn dashboard_stats(&self) -> Result<DashboardStats>;
}

/// A transactional ledger store.
pub trait LedgerStore: LedgerView {
    /// Run `f` as one all-or-nothing unit under an exclusive write lock.
    ///
    /// The unit commits when `f` returns `Ok` and rolls back otherwise.
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LedgerTx) -> Result<T>;
}
