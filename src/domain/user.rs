//! User accounts and their escrow bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::money::Credits;
use crate::error::LedgerError;

/// A wagering account.
///
/// `balance` is spendable; `frozen_balance` is escrowed by pending bets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub balance: Credits,
    pub frozen_balance: Credits,
    pub total_bets: i32,
    pub total_wins: i32,
    pub current_streak: i32,
    pub max_streak: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh account funded with `starting_credits`.
    pub fn new(
        id: UserId,
        display_name: impl Into<String>,
        starting_credits: Credits,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            balance: starting_credits,
            frozen_balance: 0,
            total_bets: 0,
            total_wins: 0,
            current_streak: 0,
            max_streak: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Spendable plus escrowed credits.
    #[must_use]
    pub fn total_assets(&self) -> Credits {
        self.balance.saturating_add(self.frozen_balance)
    }

    /// Fail unless `amount` can be drawn from the spendable balance.
    pub fn ensure_funds(&self, amount: Credits) -> Result<(), LedgerError> {
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                user_id: self.id.clone(),
                balance: self.balance,
                required: amount,
            });
        }
        Ok(())
    }

    /// Move `amount` from spendable into escrow for a new bet.
    pub fn escrow(&mut self, amount: Credits, now: DateTime<Utc>) -> Result<(), LedgerError> {
        self.ensure_funds(amount)?;
        let (Some(balance), Some(frozen)) = (
            self.balance.checked_sub(amount),
            self.frozen_balance.checked_add(amount),
        ) else {
            return Err(LedgerError::InvalidAmount { amount });
        };
        self.balance = balance;
        self.frozen_balance = frozen;
        self.total_bets += 1;
        self.updated_at = now;
        Ok(())
    }

    /// Release a winning stake from escrow and credit the payout.
    ///
    /// Leaves the user untouched if the payout does not fit the balance.
    pub fn settle_win(
        &mut self,
        stake: Credits,
        payout: Credits,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let frozen = self.release(stake)?;
        let balance = self
            .balance
            .checked_add(payout)
            .ok_or(LedgerError::InvalidAmount { amount: payout })?;
        self.frozen_balance = frozen;
        self.balance = balance;
        self.total_wins += 1;
        self.current_streak += 1;
        self.max_streak = self.max_streak.max(self.current_streak);
        self.updated_at = now;
        Ok(())
    }

    /// Release a losing stake from escrow. The stake left `balance` at
    /// placement, so only escrow changes.
    pub fn settle_loss(&mut self, stake: Credits, now: DateTime<Utc>) -> Result<(), LedgerError> {
        self.frozen_balance = self.release(stake)?;
        self.current_streak = 0;
        self.updated_at = now;
        Ok(())
    }

    fn release(&self, stake: Credits) -> Result<Credits, LedgerError> {
        self.frozen_balance
            .checked_sub(stake)
            .ok_or(LedgerError::InvalidAmount { amount: stake })
    }

    /// Apply a signed administrative correction to the spendable balance.
    pub fn adjust(&mut self, delta: Credits, now: DateTime<Utc>) -> Result<(), LedgerError> {
        let Some(next) = self.balance.checked_add(delta) else {
            return Err(LedgerError::InvalidAmount { amount: delta });
        };
        if next < 0 {
            return Err(LedgerError::InsufficientFunds {
                user_id: self.id.clone(),
                balance: self.balance,
                required: delta.saturating_neg(),
            });
        }
        self.balance = next;
        self.updated_at = now;
        Ok(())
    }
}
