//! Settlement engine.
//!
//! Resolves every pending bet on a resolved event in one atomic unit:
//! escrow is released, winners are paid the payout locked at placement, each
//! bet gets a ledger entry, and a single settlement row marks the event as
//! done. The settlement row is checked inside the unit, so racing callers
//! (a sweep and a force-settle, or two sweeps on different processes) can
//! never pay an event twice.
//!
//! Two entry points share [`settle_in_tx`]:
//!
//! - [`SettlementEngine::force_settle`] resolves and settles one event on
//!   an operator's request.
//! - [`SettlementEngine::run_sweep`] settles every resolved event that has
//!   no settlement row yet, isolating per-event failures.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::application::ranking::RankingCalculator;
use crate::domain::{EventId, EventStatus, NewCreditTransaction, Settlement};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{LedgerStore, LedgerTx};

/// Result of settling one event inside a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    Settled(Settlement),
    /// A settlement row already existed; nothing was written.
    AlreadySettled,
    /// The event no longer carries a resolution; nothing was written.
    NotResolved,
}

/// A per-event failure during a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepFailure {
    pub event_id: EventId,
    pub error: String,
}

/// Summary of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Another sweep was already running; nothing was attempted.
    pub skipped: bool,
    /// Candidate events found.
    pub candidates: usize,
    pub settled: Vec<Settlement>,
    /// Candidates settled concurrently by someone else.
    pub already_settled: usize,
    pub failed: Vec<SweepFailure>,
    pub rankings_refreshed: bool,
}

impl SweepReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }
}

/// Settle `event_id` against `outcome` inside an open unit.
///
/// Idempotent: returns [`SettleOutcome::AlreadySettled`] without writing
/// when a settlement row exists.
pub fn settle_in_tx(
    tx: &mut dyn LedgerTx,
    event_id: &EventId,
    outcome: &str,
    now: DateTime<Utc>,
) -> Result<SettleOutcome> {
    if tx.settlement_exists(event_id)? {
        debug!(event_id = %event_id, "Settlement already recorded, skipping");
        return Ok(SettleOutcome::AlreadySettled);
    }

    let mut bets = tx.pending_bets_for_event(event_id)?;
    for bet in &mut bets {
        let mut user = tx
            .user_for_update(&bet.user_id)?
            .ok_or_else(|| LedgerError::user_not_found(&bet.user_id))?;

        let entry = if bet.backs(outcome) {
            bet.win(now);
            user.settle_win(bet.amount, bet.potential_payout, now)?;
            NewCreditTransaction::bet_won(bet, user.balance, now)
        } else {
            bet.lose(now);
            user.settle_loss(bet.amount, now)?;
            NewCreditTransaction::bet_lost(bet, user.balance, now)
        };

        tx.update_bet(bet)?;
        tx.update_user(&user)?;
        tx.append_transaction(&entry)?;
    }

    let mut settlement = Settlement::tally(event_id.clone(), outcome, &bets, now);
    settlement.id = tx.insert_settlement(&settlement)?;
    Ok(SettleOutcome::Settled(settlement))
}

/// Drives settlement for manual and scheduled callers.
pub struct SettlementEngine<S> {
    store: Arc<S>,
    rankings: RankingCalculator<S>,
    sweep_lock: Mutex<()>,
}

impl<S: LedgerStore> SettlementEngine<S> {
    pub fn new(store: Arc<S>, rankings: RankingCalculator<S>) -> Self {
        Self {
            store,
            rankings,
            sweep_lock: Mutex::new(()),
        }
    }

    /// Resolve `event_id` with `outcome` and settle it immediately.
    ///
    /// The event may be open or closed; it is marked resolved with the
    /// declared label matching `outcome` in the same unit that settles it.
    /// Rankings are recomputed after commit; a ranking failure is logged
    /// and does not undo the settlement.
    ///
    /// # Errors
    /// - [`LedgerError::NotFound`] for an unknown event
    /// - [`LedgerError::AlreadyResolved`] if the event is already resolved
    /// - [`LedgerError::InvalidOutcome`] if `outcome` matches no label
    pub fn force_settle(&self, event_id: &EventId, outcome: &str) -> Result<Settlement> {
        let settlement = self.store.atomically(|tx| {
            let mut event = tx
                .event(event_id)?
                .ok_or_else(|| LedgerError::event_not_found(event_id))?;
            if event.status == EventStatus::Resolved {
                return Err(LedgerError::AlreadyResolved {
                    event_id: event_id.clone(),
                }
                .into());
            }
            let index = event.ensure_outcome(outcome)?;
            let label = event.outcomes[index].clone();

            let now = Utc::now();
            event.resolve(&label, now);
            tx.update_event(&event)?;

            match settle_in_tx(tx, event_id, &label, now)? {
                SettleOutcome::Settled(settlement) => Ok(settlement),
                SettleOutcome::AlreadySettled | SettleOutcome::NotResolved => {
                    Err(LedgerError::AlreadyResolved {
                        event_id: event_id.clone(),
                    }
                    .into())
                }
            }
        })?;

        info!(
            event_id = %event_id,
            outcome = %settlement.resolved_outcome,
            total_bets = settlement.total_bets,
            total_payouts = settlement.total_payouts,
            "Event force-settled"
        );

        self.refresh_rankings();
        Ok(settlement)
    }

    /// Settle every resolved event without a settlement row.
    ///
    /// Each event runs in its own unit; a failure is logged and left for
    /// the next sweep. If another sweep holds the lock the call returns a
    /// skipped report immediately.
    ///
    /// # Errors
    /// Returns an error only if the candidate list cannot be read.
    pub fn run_sweep(&self) -> Result<SweepReport> {
        let Some(_guard) = self.sweep_lock.try_lock() else {
            info!("Settlement sweep already running, skipping");
            return Ok(SweepReport::skipped());
        };

        let started = Instant::now();
        let events = self.store.unsettled_resolved_events()?;
        let mut report = SweepReport {
            candidates: events.len(),
            ..SweepReport::default()
        };

        if events.is_empty() {
            debug!("No unsettled events found");
            return Ok(report);
        }
        info!(count = events.len(), "Found unsettled events");

        for event in &events {
            match self.settle_resolved(&event.id) {
                Ok(SettleOutcome::Settled(settlement)) => {
                    info!(
                        event_id = %event.id,
                        outcome = %settlement.resolved_outcome,
                        total_bets = settlement.total_bets,
                        total_payouts = settlement.total_payouts,
                        "Event settled"
                    );
                    report.settled.push(settlement);
                }
                Ok(SettleOutcome::AlreadySettled) => report.already_settled += 1,
                Ok(SettleOutcome::NotResolved) => {
                    debug!(event_id = %event.id, "Event no longer resolved, skipping");
                }
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "Failed to settle event");
                    report.failed.push(SweepFailure {
                        event_id: event.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report.rankings_refreshed = self.refresh_rankings();

        info!(
            candidates = report.candidates,
            settled = report.settled.len(),
            failed = report.failed.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Settlement sweep completed"
        );
        Ok(report)
    }

    /// Settle one event, re-reading its resolution under the write lock.
    fn settle_resolved(&self, event_id: &EventId) -> Result<SettleOutcome> {
        self.store.atomically(|tx| {
            let event = tx
                .event(event_id)?
                .ok_or_else(|| LedgerError::event_not_found(event_id))?;
            let Some(outcome) = event.settlement_outcome() else {
                return Ok(SettleOutcome::NotResolved);
            };
            settle_in_tx(tx, event_id, outcome, Utc::now())
        })
    }

    fn refresh_rankings(&self) -> bool {
        match self.rankings.recalculate() {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Failed to recalculate rankings");
                false
            }
        }
    }

    /// Settlement row for an event, if settled.
    pub fn settlement(&self, event_id: &EventId) -> Result<Option<Settlement>> {
        self.store.settlement_for_event(event_id)
    }

    /// Most recent settlements, newest first.
    pub fn recent_settlements(&self, limit: i64) -> Result<Vec<Settlement>> {
        self.store.recent_settlements(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::{binary_listing, event};
    use crate::testkit::ledger::{seed_event, TempLedger};

    #[test]
    fn overlapping_sweep_is_skipped() {
        let db = TempLedger::create("engine-overlap");
        let services = db.services();
        seed_event(&services, binary_listing("rain", "1", "0"));

        let guard = services.settlement.sweep_lock.lock();
        let report = services.settlement.run_sweep().unwrap();
        assert!(report.skipped);
        assert_eq!(report.candidates, 0);
        drop(guard);

        let report = services.settlement.run_sweep().unwrap();
        assert!(!report.skipped);
        assert_eq!(report.settled_count(), 1);
        assert!(services.settlement.settlement(&event("rain")).unwrap().is_some());
    }

    #[test]
    fn settle_in_tx_is_idempotent() {
        let db = TempLedger::create("engine-idempotent");
        let services = db.services();
        seed_event(&services, binary_listing("rain", "0.5", "0.5"));

        let first = db
            .store()
            .atomically(|tx| settle_in_tx(tx, &event("rain"), "Yes", Utc::now()))
            .unwrap();
        assert!(matches!(first, SettleOutcome::Settled(_)));

        let second = db
            .store()
            .atomically(|tx| settle_in_tx(tx, &event("rain"), "Yes", Utc::now()))
            .unwrap();
        assert_eq!(second, SettleOutcome::AlreadySettled);
    }
}
