//! Builders for domain primitives used across tests.

use crate::domain::{EventId, EventListing, UserId};

pub fn user(id: &str) -> UserId {
    UserId::new(id)
}

pub fn event(id: &str) -> EventId {
    EventId::new(id)
}

/// A listing with the given `(label, price)` pairs.
pub fn listing(id: &str, outcomes: &[(&str, &str)]) -> EventListing {
    EventListing {
        id: EventId::new(id),
        question: format!("Question for {id}?"),
        category: Some("test".to_string()),
        outcomes: outcomes.iter().map(|(label, _)| (*label).to_string()).collect(),
        outcome_prices: outcomes.iter().map(|(_, price)| (*price).to_string()).collect(),
    }
}

/// A Yes/No listing priced `yes` and `1 - yes`.
pub fn binary_listing(id: &str, yes: &str, no: &str) -> EventListing {
    listing(id, &[("Yes", yes), ("No", no)])
}
