//! Prediction-market events as seen by the wagering core.
//!
//! Events are owned by the ingestion pipeline. The core reads their status,
//! outcome labels and prices, and consumes the resolution it publishes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::EventId;
use super::money::{parse_odds, Odds};
use crate::error::LedgerError;

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Open,
    Closed,
    Resolved,
}

impl EventStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "resolved" => Ok(Self::Resolved),
            other => Err(format!("unknown event status: {other}")),
        }
    }
}

/// Case-insensitive outcome label comparison.
#[must_use]
pub fn outcome_matches(label: &str, outcome: &str) -> bool {
    label == outcome || label.to_lowercase() == outcome.to_lowercase()
}

/// Winning label of a market whose prices have collapsed to certainty.
///
/// A market counts as resolved when one outcome trades at exactly `1` and
/// at least one other at exactly `0`.
#[must_use]
pub fn detect_resolution(outcomes: &[String], prices: &[String]) -> Option<String> {
    let winner = prices.iter().position(|p| p.trim() == "1")?;
    if !prices.iter().any(|p| p.trim() == "0") {
        return None;
    }
    outcomes.get(winner).cloned()
}

/// Market data published for a new or refreshed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListing {
    pub id: EventId,
    pub question: String,
    pub category: Option<String>,
    pub outcomes: Vec<String>,
    pub outcome_prices: Vec<String>,
}

/// A wagering event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub question: String,
    pub category: Option<String>,
    pub outcomes: Vec<String>,
    pub outcome_prices: Vec<String>,
    pub status: EventStatus,
    pub resolved_outcome: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// An open event built from a listing.
    #[must_use]
    pub fn open(listing: EventListing, now: DateTime<Utc>) -> Self {
        Self {
            id: listing.id,
            question: listing.question,
            category: listing.category,
            outcomes: listing.outcomes,
            outcome_prices: listing.outcome_prices,
            status: EventStatus::Open,
            resolved_outcome: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == EventStatus::Open
    }

    /// Index of the declared label matching `outcome`, ignoring case.
    #[must_use]
    pub fn outcome_index(&self, outcome: &str) -> Option<usize> {
        self.outcomes
            .iter()
            .position(|label| outcome_matches(label, outcome))
    }

    /// Fail unless `outcome` names one of the declared labels.
    pub fn ensure_outcome(&self, outcome: &str) -> Result<usize, LedgerError> {
        self.outcome_index(outcome)
            .ok_or_else(|| LedgerError::InvalidOutcome {
                event_id: self.id.clone(),
                outcome: outcome.to_string(),
            })
    }

    /// Current price for `outcome`, checked for betting.
    ///
    /// Requires the event to be open, the outcome to be declared and priced,
    /// and the price to be a positive number.
    pub fn quote(&self, outcome: &str) -> Result<Odds, LedgerError> {
        if !self.is_open() {
            return Err(LedgerError::EventNotOpen {
                event_id: self.id.clone(),
                status: self.status,
            });
        }
        let index = self.ensure_outcome(outcome)?;
        let price = self
            .outcome_prices
            .get(index)
            .ok_or_else(|| LedgerError::InvalidOutcome {
                event_id: self.id.clone(),
                outcome: outcome.to_string(),
            })?;
        parse_odds(price).ok_or_else(|| LedgerError::InvalidOdds {
            outcome: outcome.to_string(),
            price: price.clone(),
        })
    }

    /// The outcome to settle against, once the event is resolved.
    #[must_use]
    pub fn settlement_outcome(&self) -> Option<&str> {
        match self.status {
            EventStatus::Resolved => self.resolved_outcome.as_deref(),
            _ => None,
        }
    }

    /// Transition into `resolved` with the winning label.
    pub fn resolve(&mut self, outcome: &str, now: DateTime<Utc>) {
        self.status = EventStatus::Resolved;
        self.resolved_outcome = Some(outcome.to_string());
        self.resolved_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn yes_no(prices: [&str; 2]) -> Event {
        Event::open(
            EventListing {
                id: EventId::new("evt-1"),
                question: "Will it rain?".into(),
                category: None,
                outcomes: vec!["Yes".into(), "No".into()],
                outcome_prices: prices.iter().map(|p| (*p).to_string()).collect(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn lowercase_outcome_resolves_to_declared_label() {
        let event = yes_no(["0.5", "0.5"]);
        assert_eq!(event.outcome_index("yes"), Some(0));
        assert_eq!(event.outcome_index("NO"), Some(1));
        assert_eq!(event.outcome_index("maybe"), None);
    }

    #[test]
    fn quote_returns_locked_price() {
        let event = yes_no(["0.65", "0.35"]);
        assert_eq!(event.quote("yes").unwrap(), dec!(0.65));
        assert_eq!(event.quote("No").unwrap(), dec!(0.35));
    }

    #[test]
    fn quote_rejects_unknown_outcome() {
        let event = yes_no(["0.5", "0.5"]);
        assert!(matches!(
            event.quote("Maybe"),
            Err(LedgerError::InvalidOutcome { .. })
        ));
    }

    #[test]
    fn quote_rejects_unpriced_outcome() {
        let mut event = yes_no(["0.5", "0.5"]);
        event.outcome_prices.truncate(1);
        assert!(matches!(
            event.quote("No"),
            Err(LedgerError::InvalidOutcome { .. })
        ));
    }

    #[test]
    fn quote_rejects_zero_price() {
        let event = yes_no(["0", "1"]);
        assert!(matches!(
            event.quote("Yes"),
            Err(LedgerError::InvalidOdds { .. })
        ));
    }

    #[test]
    fn quote_rejects_closed_event() {
        let mut event = yes_no(["0.5", "0.5"]);
        event.status = EventStatus::Closed;
        assert!(matches!(
            event.quote("Yes"),
            Err(LedgerError::EventNotOpen {
                status: EventStatus::Closed,
                ..
            })
        ));
        // Status is checked before the label.
        assert!(matches!(
            event.quote("Maybe"),
            Err(LedgerError::EventNotOpen { .. })
        ));
    }

    #[test]
    fn settlement_outcome_requires_resolution() {
        let mut event = yes_no(["0.5", "0.5"]);
        assert!(event.settlement_outcome().is_none());
        event.resolve("Yes", Utc::now());
        assert_eq!(event.settlement_outcome(), Some("Yes"));
        assert!(event.resolved_at.is_some());
    }

    #[test]
    fn detects_resolution_from_collapsed_prices() {
        let outcomes = vec!["Yes".to_string(), "No".to_string()];
        let resolved = vec!["0".to_string(), "1".to_string()];
        assert_eq!(detect_resolution(&outcomes, &resolved), Some("No".into()));

        let trading = vec!["0.4".to_string(), "0.6".to_string()];
        assert_eq!(detect_resolution(&outcomes, &trading), None);

        let no_zero = vec!["1".to_string(), "1".to_string()];
        assert_eq!(detect_resolution(&outcomes, &no_zero), None);
    }

    #[test]
    fn status_roundtrips_through_text() {
        for status in [EventStatus::Open, EventStatus::Closed, EventStatus::Resolved] {
            assert_eq!(status.as_str().parse::<EventStatus>().unwrap(), status);
        }
        assert!("pending".parse::<EventStatus>().is_err());
    }
}
