//! Bets and their one-way status transitions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::outcome_matches;
use super::id::{BetId, EventId, UserId};
use super::money::{Credits, Odds};

/// Status of a bet.
///
/// `Pending` moves to `Won` or `Lost` exactly once, during settlement.
/// `Cancelled` is reserved for refunds and never produced by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
    Cancelled,
}

impl BetStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true once the bet has been decided.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown bet status: {other}")),
        }
    }
}

/// A stake on one outcome of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub id: BetId,
    pub user_id: UserId,
    pub event_id: EventId,
    /// Outcome label as supplied by the bettor.
    pub outcome: String,
    pub amount: Credits,
    pub locked_odds: Odds,
    pub potential_payout: Credits,
    pub status: BetStatus,
    pub payout: Option<Credits>,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Bet {
    /// A freshly placed, pending bet.
    #[must_use]
    pub fn pending(
        user_id: UserId,
        event_id: EventId,
        outcome: impl Into<String>,
        amount: Credits,
        locked_odds: Odds,
        potential_payout: Credits,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BetId::new(),
            user_id,
            event_id,
            outcome: outcome.into(),
            amount,
            locked_odds,
            potential_payout,
            status: BetStatus::Pending,
            payout: None,
            settled_at: None,
            created_at: now,
        }
    }

    /// Whether this bet backed `resolved_outcome`, ignoring case.
    #[must_use]
    pub fn backs(&self, resolved_outcome: &str) -> bool {
        outcome_matches(&self.outcome, resolved_outcome)
    }

    /// Mark won with the payout locked at placement.
    pub fn win(&mut self, now: DateTime<Utc>) {
        self.status = BetStatus::Won;
        self.payout = Some(self.potential_payout);
        self.settled_at = Some(now);
    }

    pub fn lose(&mut self, now: DateTime<Utc>) {
        self.status = BetStatus::Lost;
        self.payout = Some(0);
        self.settled_at = Some(now);
    }

    /// Net result for a settled bet: payout minus stake, or minus the stake
    /// for a loss. `None` while undecided.
    #[must_use]
    pub fn profit(&self) -> Option<Credits> {
        match self.status {
            BetStatus::Won => Some(self.payout.unwrap_or(0) - self.amount),
            BetStatus::Lost => Some(-self.amount),
            BetStatus::Pending | BetStatus::Cancelled => None,
        }
    }
}
