//! Handlers for the `event` command group.

use serde_json::json;

use crate::adapter::inbound::cli::command::{EventCommand, PublishArgs, ResolveArgs};
use crate::adapter::inbound::cli::output;
use crate::domain::{EventId, EventListing};
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;
use crate::port::outbound::ledger::LedgerStore;

/// Execute an `event` subcommand.
pub fn execute<S: LedgerStore>(services: &Services<S>, command: &EventCommand) -> Result<()> {
    match command {
        EventCommand::Publish(args) => publish(services, args),
        EventCommand::Resolve(args) => resolve(services, args),
    }
}

fn publish<S: LedgerStore>(services: &Services<S>, args: &PublishArgs) -> Result<()> {
    let listing = EventListing {
        id: EventId::new(&args.event),
        question: args.question.clone(),
        category: args.category.clone(),
        outcomes: args.outcomes.clone(),
        outcome_prices: args.prices.clone(),
    };
    let outcome = services.feed.publish_event(listing)?;

    if output::is_json() {
        return output::json_output("event.publish", &outcome);
    }

    let verb = if outcome.created { "Created" } else { "Updated" };
    output::success(&format!("{verb} event {}", outcome.event_id));
    if let Some(winner) = &outcome.resolved {
        output::note(&format!("Prices resolved the event as '{winner}'"));
    }
    Ok(())
}

fn resolve<S: LedgerStore>(services: &Services<S>, args: &ResolveArgs) -> Result<()> {
    let event_id = EventId::new(&args.event);
    let changed = services.feed.publish_resolution(&event_id, &args.outcome)?;

    if output::is_json() {
        return output::json_output(
            "event.resolve",
            json!({ "event_id": event_id, "changed": changed }),
        );
    }

    if changed {
        output::success(&format!("Event {event_id} resolved; it settles on the next sweep"));
    } else {
        output::note(&format!("Event {event_id} was already resolved"));
    }
    Ok(())
}
