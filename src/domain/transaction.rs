//! Append-only credit ledger entries and their replay.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bet::Bet;
use super::id::UserId;
use super::money::Credits;

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    SignupBonus,
    BetPlaced,
    BetWon,
    BetLost,
    AdminAdjustment,
}

impl TransactionKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SignupBonus => "signup_bonus",
            Self::BetPlaced => "bet_placed",
            Self::BetWon => "bet_won",
            Self::BetLost => "bet_lost",
            Self::AdminAdjustment => "admin_adjustment",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup_bonus" => Ok(Self::SignupBonus),
            "bet_placed" => Ok(Self::BetPlaced),
            "bet_won" => Ok(Self::BetWon),
            "bet_lost" => Ok(Self::BetLost),
            "admin_adjustment" => Ok(Self::AdminAdjustment),
            other => Err(format!("unknown transaction kind: {other}")),
        }
    }
}

/// A ledger entry to append. The store assigns id and timestamp order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCreditTransaction {
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Credits,
    pub balance_after: Credits,
    pub reference_id: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewCreditTransaction {
    pub fn signup_bonus(user_id: UserId, amount: Credits, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            kind: TransactionKind::SignupBonus,
            amount,
            balance_after: amount,
            reference_id: None,
            description: Some("starting credits".into()),
            created_at: now,
        }
    }

    /// Debit of the stake at placement.
    pub fn bet_placed(bet: &Bet, balance_after: Credits) -> Self {
        Self {
            user_id: bet.user_id.clone(),
            kind: TransactionKind::BetPlaced,
            amount: -bet.amount,
            balance_after,
            reference_id: Some(bet.id.to_string()),
            description: Some(format!("bet on {} for {}", bet.event_id, bet.outcome)),
            created_at: bet.created_at,
        }
    }

    pub fn bet_won(bet: &Bet, balance_after: Credits, now: DateTime<Utc>) -> Self {
        Self {
            user_id: bet.user_id.clone(),
            kind: TransactionKind::BetWon,
            amount: bet.payout.unwrap_or(bet.potential_payout),
            balance_after,
            reference_id: Some(bet.id.to_string()),
            description: Some(format!("won on {}", bet.event_id)),
            created_at: now,
        }
    }

    /// Zero-amount marker; the stake already left `balance` at placement.
    pub fn bet_lost(bet: &Bet, balance_after: Credits, now: DateTime<Utc>) -> Self {
        Self {
            user_id: bet.user_id.clone(),
            kind: TransactionKind::BetLost,
            amount: 0,
            balance_after,
            reference_id: Some(bet.id.to_string()),
            description: Some(format!("lost on {}", bet.event_id)),
            created_at: now,
        }
    }

    pub fn admin_adjustment(
        user_id: UserId,
        delta: Credits,
        balance_after: Credits,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            kind: TransactionKind::AdminAdjustment,
            amount: delta,
            balance_after,
            reference_id: None,
            description: Some("admin adjustment".into()),
            created_at: now,
        }
    }
}

/// A stored ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub id: i64,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Credits,
    pub balance_after: Credits,
    pub reference_id: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of replaying a user's ledger against their account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerAudit {
    pub user_id: UserId,
    pub entries: usize,
    pub replayed_balance: Credits,
    pub balance: Credits,
    pub frozen_balance: Credits,
    pub pending_stake: Credits,
    /// Ids of entries whose `balance_after` does not follow from the
    /// previous entry.
    pub broken_links: Vec<i64>,
}

impl LedgerAudit {
    /// Replay `entries` (oldest first) and compare with the account.
    #[must_use]
    pub fn replay(
        user_id: UserId,
        entries: &[CreditTransaction],
        balance: Credits,
        frozen_balance: Credits,
        pending_stake: Credits,
    ) -> Self {
        let mut running: Credits = 0;
        let mut broken_links = Vec::new();
        for entry in entries {
            running += entry.amount;
            if entry.balance_after != running {
                broken_links.push(entry.id);
            }
        }
        Self {
            user_id,
            entries: entries.len(),
            replayed_balance: running,
            balance,
            frozen_balance,
            pending_stake,
            broken_links,
        }
    }

    /// Replay matches the balance, every link chains, and escrow equals the
    /// open stakes.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.replayed_balance == self.balance
            && self.broken_links.is_empty()
            && self.frozen_balance == self.pending_stake
    }
}
