//! Bet placement.
//!
//! Escrows a user's stake against an open event at the currently published
//! price. The whole placement is one atomic unit: the balance debit, the
//! pending bet and its ledger entry commit together or not at all.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::money::potential_payout;
use crate::domain::{Bet, BetStatus, Credits, EventId, NewCreditTransaction, UserId};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{LedgerStore, LedgerTx};

/// Places bets against a ledger store.
pub struct BetLedger<S> {
    store: Arc<S>,
}

impl<S> Clone for BetLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> BetLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Stake `amount` credits on `outcome` of `event_id`.
    ///
    /// `outcome` is matched case-insensitively against the event's labels
    /// and stored as given.
    ///
    /// # Errors
    /// - [`LedgerError::InvalidAmount`] if `amount` is not positive
    /// - [`LedgerError::NotFound`] for an unknown user or event
    /// - [`LedgerError::InsufficientFunds`] if the balance is below `amount`
    /// - [`LedgerError::InvalidOutcome`], [`LedgerError::EventNotOpen`],
    ///   [`LedgerError::InvalidOdds`] from the event checks
    /// - store failures, which leave nothing written
    pub fn place_bet(
        &self,
        user_id: &UserId,
        event_id: &EventId,
        outcome: &str,
        amount: Credits,
    ) -> Result<Bet> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount { amount }.into());
        }

        let bet = self
            .store
            .atomically(|tx| place_in_tx(tx, user_id, event_id, outcome, amount))?;

        info!(
            bet_id = %bet.id,
            user_id = %bet.user_id,
            event_id = %bet.event_id,
            outcome = %bet.outcome,
            amount = bet.amount,
            odds = %bet.locked_odds,
            potential_payout = bet.potential_payout,
            "Bet placed"
        );
        Ok(bet)
    }

    /// A user's bets, newest first.
    pub fn bets_for_user(&self, user_id: &UserId, status: Option<BetStatus>) -> Result<Vec<Bet>> {
        self.store.bets_for_user(user_id, status)
    }
}

fn place_in_tx(
    tx: &mut dyn LedgerTx,
    user_id: &UserId,
    event_id: &EventId,
    outcome: &str,
    amount: Credits,
) -> Result<Bet> {
    let mut user = tx
        .user_for_update(user_id)?
        .ok_or_else(|| LedgerError::user_not_found(user_id))?;
    user.ensure_funds(amount)?;

    let event = tx
        .event(event_id)?
        .ok_or_else(|| LedgerError::event_not_found(event_id))?;
    let odds = event.quote(outcome)?;
    let payout = potential_payout(amount, odds).ok_or(LedgerError::InvalidAmount { amount })?;

    let now = Utc::now();
    user.escrow(amount, now)?;
    tx.update_user(&user)?;

    let bet = Bet::pending(
        user_id.clone(),
        event_id.clone(),
        outcome,
        amount,
        odds,
        payout,
        now,
    );
    tx.insert_bet(&bet)?;
    tx.append_transaction(&NewCreditTransaction::bet_placed(&bet, user.balance))?;

    debug!(bet_id = %bet.id, balance_after = user.balance, "Stake escrowed");
    Ok(bet)
}
