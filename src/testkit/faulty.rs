//! Fault injection for atomic units.
//!
//! [`FaultyStore`] wraps a real store and fails one chosen step inside any
//! unit it opens, after the steps before it have already written. Tests use
//! it to check that a failed unit leaves no partial state behind.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::domain::{
    Bet, BetId, BetStatus, CreditTransaction, Credits, DashboardStats, Event, EventId,
    NewCreditTransaction, Ranking, RankingPeriod, Settlement, User, UserId,
};
use crate::error::{Error, Result};
use crate::port::outbound::ledger::{LedgerStore, LedgerTx, LedgerView};

/// A write step that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    UpdateUser,
    InsertBet,
    UpdateBet,
    AppendTransaction,
    InsertSettlement,
    ReplaceRankings,
}

#[derive(Debug, Clone, Default)]
struct FaultPlan {
    point: Option<FaultPoint>,
    /// Only fail units touching this event's settlement.
    event: Option<EventId>,
}

pub struct FaultyStore<S> {
    inner: Arc<S>,
    plan: Mutex<FaultPlan>,
}

impl<S: LedgerStore> FaultyStore<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            plan: Mutex::new(FaultPlan::default()),
        }
    }

    /// Fail every future call to `point`.
    pub fn fail_at(&self, point: FaultPoint) {
        *self.plan.lock() = FaultPlan {
            point: Some(point),
            event: None,
        };
    }

    /// Fail the settlement insert for `event_id` only.
    pub fn fail_settlement_of(&self, event_id: EventId) {
        *self.plan.lock() = FaultPlan {
            point: Some(FaultPoint::InsertSettlement),
            event: Some(event_id),
        };
    }

    pub fn clear(&self) {
        *self.plan.lock() = FaultPlan::default();
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

struct FaultyTx<'a> {
    inner: &'a mut dyn LedgerTx,
    plan: FaultPlan,
}

impl FaultyTx<'_> {
    fn check(&self, point: FaultPoint) -> Result<()> {
        if self.plan.point == Some(point) && self.plan.event.is_none() {
            return Err(Error::Database(format!("injected fault at {point:?}")));
        }
        Ok(())
    }
}

impl LedgerTx for FaultyTx<'_> {
    fn user_for_update(&mut self, id: &UserId) -> Result<Option<User>> {
        self.inner.user_for_update(id)
    }

    fn insert_user(&mut self, user: &User) -> Result<()> {
        self.inner.insert_user(user)
    }

    fn update_user(&mut self, user: &User) -> Result<()> {
        self.check(FaultPoint::UpdateUser)?;
        self.inner.update_user(user)
    }

    fn event(&mut self, id: &EventId) -> Result<Option<Event>> {
        self.inner.event(id)
    }

    fn insert_event(&mut self, event: &Event) -> Result<()> {
        self.inner.insert_event(event)
    }

    fn update_event(&mut self, event: &Event) -> Result<()> {
        self.inner.update_event(event)
    }

    fn insert_bet(&mut self, bet: &Bet) -> Result<()> {
        self.check(FaultPoint::InsertBet)?;
        self.inner.insert_bet(bet)
    }

    fn update_bet(&mut self, bet: &Bet) -> Result<()> {
        self.check(FaultPoint::UpdateBet)?;
        self.inner.update_bet(bet)
    }

    fn pending_bets_for_event(&mut self, event_id: &EventId) -> Result<Vec<Bet>> {
        self.inner.pending_bets_for_event(event_id)
    }

    fn settlement_exists(&mut self, event_id: &EventId) -> Result<bool> {
        self.inner.settlement_exists(event_id)
    }

    fn insert_settlement(&mut self, settlement: &Settlement) -> Result<i64> {
        if self.plan.point == Some(FaultPoint::InsertSettlement)
            && self
                .plan
                .event
                .as_ref()
                .map_or(true, |id| *id == settlement.event_id)
        {
            return Err(Error::Database(format!(
                "injected fault settling {}",
                settlement.event_id
            )));
        }
        self.inner.insert_settlement(settlement)
    }

    fn append_transaction(&mut self, entry: &NewCreditTransaction) -> Result<i64> {
        self.check(FaultPoint::AppendTransaction)?;
        self.inner.append_transaction(entry)
    }

    fn users_with_bets(&mut self) -> Result<Vec<User>> {
        self.inner.users_with_bets()
    }

    fn lost_bet_counts(&mut self) -> Result<HashMap<UserId, i64>> {
        self.inner.lost_bet_counts()
    }

    fn settled_bets_since(&mut self, since: DateTime<Utc>) -> Result<Vec<Bet>> {
        self.inner.settled_bets_since(since)
    }

    fn replace_rankings(&mut self, period: RankingPeriod, rows: &[Ranking]) -> Result<()> {
        self.check(FaultPoint::ReplaceRankings)?;
        self.inner.replace_rankings(period, rows)
    }
}

impl<S: LedgerStore> LedgerView for FaultyStore<S> {
    fn user(&self, id: &UserId) -> Result<Option<User>> {
        self.inner.user(id)
    }

    fn event(&self, id: &EventId) -> Result<Option<Event>> {
        self.inner.event(id)
    }

    fn bet(&self, id: &BetId) -> Result<Option<Bet>> {
        self.inner.bet(id)
    }

    fn bets_for_user(&self, user_id: &UserId, status: Option<BetStatus>) -> Result<Vec<Bet>> {
        self.inner.bets_for_user(user_id, status)
    }

    fn pending_stake(&self, user_id: &UserId) -> Result<Credits> {
        self.inner.pending_stake(user_id)
    }

    fn settlement_for_event(&self, event_id: &EventId) -> Result<Option<Settlement>> {
        self.inner.settlement_for_event(event_id)
    }

    fn recent_settlements(&self, limit: i64) -> Result<Vec<Settlement>> {
        self.inner.recent_settlements(limit)
    }

    fn transactions_for_user(&self, user_id: &UserId) -> Result<Vec<CreditTransaction>> {
        self.inner.transactions_for_user(user_id)
    }

    fn rankings(&self, period: RankingPeriod) -> Result<Vec<Ranking>> {
        self.inner.rankings(period)
    }

    fn unsettled_resolved_events(&self) -> Result<Vec<Event>> {
        self.inner.unsettled_resolved_events()
    }

    fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.inner.dashboard_stats()
    }
}

impl<S: LedgerStore> LedgerStore for FaultyStore<S> {
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LedgerTx) -> Result<T>,
    {
        let plan = self.plan.lock().clone();
        self.inner.atomically(move |tx| {
            let mut faulty = FaultyTx { inner: tx, plan };
            f(&mut faulty)
        })
    }
}
