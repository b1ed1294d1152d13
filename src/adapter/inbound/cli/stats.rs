//! Handler for the `stats` command.

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;
use crate::port::outbound::ledger::LedgerStore;

/// Number of recent settlements listed under the counters.
const RECENT_SETTLEMENTS: i64 = 5;

/// Execute `stats`.
pub fn execute<S: LedgerStore>(services: &Services<S>) -> Result<()> {
    let stats = services.store.dashboard_stats()?;
    let recent = services.settlement.recent_settlements(RECENT_SETTLEMENTS)?;

    if output::is_json() {
        return output::json_output(
            "stats",
            json!({ "stats": stats, "recent_settlements": recent }),
        );
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Users", stats.total_users);
    output::field("Open events", stats.open_events);
    output::field("Settled", stats.settled_events);
    output::field("Bets", stats.total_bets);
    output::field("Pending", stats.pending_bets);
    output::field("Volume", stats.total_volume);
    if let Some(average) = stats.average_stake() {
        output::field("Avg stake", average);
    }

    if !recent.is_empty() {
        output::section("Recent settlements");
        for settlement in &recent {
            output::lines(&format!(
                "{}  {}  {} bets  {} paid",
                output::muted(settlement.settled_at.format("%Y-%m-%d %H:%M")),
                settlement.event_id,
                settlement.total_bets,
                settlement.total_payouts
            ));
        }
    }
    Ok(())
}
