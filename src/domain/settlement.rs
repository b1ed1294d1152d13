//! Settlement summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bet::{Bet, BetStatus};
use super::id::EventId;
use super::money::Credits;

/// One row per settled event. Its existence marks the event as settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Store-assigned id; `0` until inserted.
    pub id: i64,
    pub event_id: EventId,
    pub resolved_outcome: String,
    pub total_bets: i64,
    pub total_payouts: Credits,
    pub settled_at: DateTime<Utc>,
}

impl Settlement {
    /// Summarise the bets decided for `event_id`.
    #[must_use]
    pub fn tally(
        event_id: EventId,
        resolved_outcome: impl Into<String>,
        bets: &[Bet],
        settled_at: DateTime<Utc>,
    ) -> Self {
        let total_payouts = bets
            .iter()
            .filter(|b| b.status == BetStatus::Won)
            .filter_map(|b| b.payout)
            .sum();
        Self {
            id: 0,
            event_id,
            resolved_outcome: resolved_outcome.into(),
            total_bets: bets.len() as i64,
            total_payouts,
            settled_at,
        }
    }
}
