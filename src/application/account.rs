//! Account provisioning, administrative balance corrections and ledger
//! audits.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{CreditTransaction, Credits, LedgerAudit, NewCreditTransaction, User, UserId};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::LedgerStore;

pub struct AccountService<S> {
    store: Arc<S>,
    starting_credits: Credits,
}

impl<S> Clone for AccountService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            starting_credits: self.starting_credits,
        }
    }
}

impl<S: LedgerStore> AccountService<S> {
    pub fn new(store: Arc<S>, starting_credits: Credits) -> Self {
        Self {
            store,
            starting_credits,
        }
    }

    /// Get or create the account for `user_id`.
    ///
    /// A new account is funded with the starting credits and a matching
    /// `signup_bonus` entry. Calling again returns the existing account
    /// unchanged.
    pub fn open_account(&self, user_id: &UserId, display_name: &str) -> Result<User> {
        let starting_credits = self.starting_credits;
        let (user, created) = self.store.atomically(|tx| {
            if let Some(existing) = tx.user_for_update(user_id)? {
                return Ok((existing, false));
            }
            let now = Utc::now();
            let user = User::new(user_id.clone(), display_name, starting_credits, now);
            tx.insert_user(&user)?;
            tx.append_transaction(&NewCreditTransaction::signup_bonus(
                user_id.clone(),
                starting_credits,
                now,
            ))?;
            Ok((user, true))
        })?;

        if created {
            info!(user_id = %user.id, balance = user.balance, "Account opened");
        }
        Ok(user)
    }

    /// Apply a signed correction to a user's spendable balance.
    ///
    /// # Errors
    /// - [`LedgerError::InvalidAmount`] for a zero delta
    /// - [`LedgerError::NotFound`] for an unknown user
    /// - [`LedgerError::InsufficientFunds`] if the balance would go negative
    pub fn adjust_balance(&self, user_id: &UserId, delta: Credits) -> Result<User> {
        if delta == 0 {
            return Err(LedgerError::InvalidAmount { amount: delta }.into());
        }
        let user = self.store.atomically(|tx| {
            let mut user = tx
                .user_for_update(user_id)?
                .ok_or_else(|| LedgerError::user_not_found(user_id))?;
            let now = Utc::now();
            user.adjust(delta, now)?;
            tx.update_user(&user)?;
            tx.append_transaction(&NewCreditTransaction::admin_adjustment(
                user_id.clone(),
                delta,
                user.balance,
                now,
            ))?;
            Ok(user)
        })?;

        info!(user_id = %user_id, delta, balance = user.balance, "Balance adjusted");
        Ok(user)
    }

    /// Replay a user's ledger and compare it with the stored balances.
    pub fn audit(&self, user_id: &UserId) -> Result<LedgerAudit> {
        let user = self
            .store
            .user(user_id)?
            .ok_or_else(|| LedgerError::user_not_found(user_id))?;
        let entries = self.store.transactions_for_user(user_id)?;
        let pending = self.store.pending_stake(user_id)?;

        let audit = LedgerAudit::replay(
            user_id.clone(),
            &entries,
            user.balance,
            user.frozen_balance,
            pending,
        );
        if !audit.is_consistent() {
            warn!(
                user_id = %user_id,
                replayed = audit.replayed_balance,
                balance = audit.balance,
                frozen = audit.frozen_balance,
                pending = audit.pending_stake,
                broken_links = audit.broken_links.len(),
                "Ledger audit found drift"
            );
        }
        Ok(audit)
    }

    pub fn user(&self, user_id: &UserId) -> Result<User> {
        self.store
            .user(user_id)?
            .ok_or_else(|| LedgerError::user_not_found(user_id).into())
    }

    pub fn transactions(&self, user_id: &UserId) -> Result<Vec<CreditTransaction>> {
        self.store.transactions_for_user(user_id)
    }
}
