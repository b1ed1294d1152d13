//! Ingestion contract.
//!
//! The market-data pipeline publishes events and their resolutions through
//! this service. Resolution is accepted at most once per event: repeated
//! marking, or marking an event that was force-settled, is a no-op.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{detect_resolution, Event, EventId, EventListing, EventStatus};
use crate::error::{LedgerError, Result};
use crate::port::outbound::ledger::{LedgerStore, LedgerTx};

/// What a publish changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub event_id: EventId,
    /// The event did not exist before.
    pub created: bool,
    /// Winning label, if the published prices resolved the event.
    pub resolved: Option<String>,
}

pub struct EventFeed<S> {
    store: Arc<S>,
}

impl<S> Clone for EventFeed<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> EventFeed<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Insert a new open event, or refresh question, category, labels and
    /// prices of an existing one without touching its status.
    ///
    /// When the prices have collapsed to a certain winner the event is
    /// marked resolved in the same unit.
    pub fn publish_event(&self, listing: EventListing) -> Result<PublishOutcome> {
        let event_id = listing.id.clone();
        let outcome = self.store.atomically(|tx| {
            let now = Utc::now();
            let created = match tx.event(&listing.id)? {
                Some(mut event) => {
                    event.question = listing.question.clone();
                    event.category = listing.category.clone();
                    event.outcomes = listing.outcomes.clone();
                    event.outcome_prices = listing.outcome_prices.clone();
                    event.updated_at = now;
                    tx.update_event(&event)?;
                    false
                }
                None => {
                    tx.insert_event(&Event::open(listing.clone(), now))?;
                    true
                }
            };

            let resolved = match detect_resolution(&listing.outcomes, &listing.outcome_prices) {
                Some(winner) if mark_resolved(tx, &listing.id, &winner)? => Some(winner),
                _ => None,
            };
            Ok(PublishOutcome {
                event_id: listing.id.clone(),
                created,
                resolved,
            })
        })?;

        debug!(
            event_id = %event_id,
            created = outcome.created,
            resolved = ?outcome.resolved,
            "Event published"
        );
        Ok(outcome)
    }

    /// Mark `event_id` resolved with `outcome`.
    ///
    /// Only open or closed events transition. Returns whether anything
    /// changed.
    ///
    /// # Errors
    /// - [`LedgerError::NotFound`] for an unknown event
    /// - [`LedgerError::InvalidOutcome`] if `outcome` matches no label
    pub fn publish_resolution(&self, event_id: &EventId, outcome: &str) -> Result<bool> {
        self.store.atomically(|tx| mark_resolved(tx, event_id, outcome))
    }

    pub fn event(&self, event_id: &EventId) -> Result<Event> {
        self.store
            .event(event_id)?
            .ok_or_else(|| LedgerError::event_not_found(event_id).into())
    }
}

fn mark_resolved(tx: &mut dyn LedgerTx, event_id: &EventId, outcome: &str) -> Result<bool> {
    let mut event = tx
        .event(event_id)?
        .ok_or_else(|| LedgerError::event_not_found(event_id))?;
    if event.status == EventStatus::Resolved {
        debug!(event_id = %event_id, "Event already resolved, ignoring");
        return Ok(false);
    }
    let index = event.ensure_outcome(outcome)?;
    let label = event.outcomes[index].clone();
    event.resolve(&label, Utc::now());
    tx.update_event(&event)?;
    info!(event_id = %event_id, outcome = %label, "Event resolved");
    Ok(true)
}
