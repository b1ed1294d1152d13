//! Leaderboard recomputation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::ranking::{rank_all_time, rank_window};
use crate::domain::{Credits, Ranking, RankingPeriod};
use crate::error::Result;
use crate::port::outbound::ledger::{LedgerStore, LedgerTx};

/// Inputs that shape the leaderboard.
#[derive(Debug, Clone, Copy)]
pub struct RankingPolicy {
    /// Credits every account starts with; profit is measured against it.
    pub starting_credits: Credits,
    pub weekly_days: i64,
    pub monthly_days: i64,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            starting_credits: 10_000,
            weekly_days: 7,
            monthly_days: 30,
        }
    }
}

impl RankingPolicy {
    /// Window length for a period, or `None` for all-time.
    #[must_use]
    pub fn window(&self, period: RankingPeriod) -> Option<Duration> {
        match period {
            RankingPeriod::AllTime => None,
            RankingPeriod::Weekly => Some(Duration::days(self.weekly_days)),
            RankingPeriod::Monthly => Some(Duration::days(self.monthly_days)),
        }
    }
}

/// Row counts written by one rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RankingSummary {
    pub all_time: usize,
    pub weekly: usize,
    pub monthly: usize,
}

/// Rebuilds every leaderboard period wholesale.
pub struct RankingCalculator<S> {
    store: Arc<S>,
    policy: RankingPolicy,
}

impl<S> Clone for RankingCalculator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<S: LedgerStore> RankingCalculator<S> {
    pub fn new(store: Arc<S>, policy: RankingPolicy) -> Self {
        Self { store, policy }
    }

    /// Rebuild all periods as of now.
    pub fn recalculate(&self) -> Result<RankingSummary> {
        self.recalculate_at(Utc::now())
    }

    /// Rebuild all periods as of `now`, in a single atomic unit.
    ///
    /// For a fixed `now` and unchanged bets, repeated calls write identical
    /// rows.
    pub fn recalculate_at(&self, now: DateTime<Utc>) -> Result<RankingSummary> {
        let policy = self.policy;
        let summary = self.store.atomically(|tx| {
            let mut summary = RankingSummary::default();
            for period in RankingPeriod::ALL {
                let rows = build_period(tx, &policy, period, now)?;
                tx.replace_rankings(period, &rows)?;
                match period {
                    RankingPeriod::AllTime => summary.all_time = rows.len(),
                    RankingPeriod::Weekly => summary.weekly = rows.len(),
                    RankingPeriod::Monthly => summary.monthly = rows.len(),
                }
            }
            Ok(summary)
        })?;

        info!(
            all_time = summary.all_time,
            weekly = summary.weekly,
            monthly = summary.monthly,
            "Rankings recalculated"
        );
        Ok(summary)
    }

    /// Stored leaderboard for `period`.
    pub fn rankings(&self, period: RankingPeriod) -> Result<Vec<Ranking>> {
        self.store.rankings(period)
    }
}

fn build_period(
    tx: &mut dyn LedgerTx,
    policy: &RankingPolicy,
    period: RankingPeriod,
    now: DateTime<Utc>,
) -> Result<Vec<Ranking>> {
    match policy.window(period) {
        None => {
            let users = tx.users_with_bets()?;
            let lost = tx.lost_bet_counts()?;
            Ok(rank_all_time(&users, &lost, policy.starting_credits, now))
        }
        Some(window) => {
            let settled = tx.settled_bets_since(now - window)?;
            Ok(rank_window(period, &settled, policy.starting_credits, now))
        }
    }
}
