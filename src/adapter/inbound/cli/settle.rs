//! Handlers for the `settle` and `sweep` commands.

use serde_json::json;

use crate::adapter::inbound::cli::command::SettleArgs;
use crate::adapter::inbound::cli::output;
use crate::application::SweepReport;
use crate::domain::{EventId, Settlement};
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;
use crate::port::outbound::ledger::LedgerStore;

/// Execute `settle <event> <outcome>`.
pub fn execute_settle<S: LedgerStore>(services: &Services<S>, args: &SettleArgs) -> Result<()> {
    let settlement = services
        .settlement
        .force_settle(&EventId::new(&args.event), &args.outcome)?;

    if output::is_json() {
        return output::json_output("settle", json!({ "settlement": settlement }));
    }

    output::success(&format!(
        "Event {} settled as '{}'",
        settlement.event_id, settlement.resolved_outcome
    ));
    print_settlement(&settlement);
    Ok(())
}

/// Execute `sweep`.
pub fn execute_sweep<S: LedgerStore>(services: &Services<S>) -> Result<()> {
    let report = services.settlement.run_sweep()?;

    if output::is_json() {
        return output::json_output("sweep", &report);
    }
    print_report(&report);
    Ok(())
}

fn print_settlement(settlement: &Settlement) {
    output::field("Bets", settlement.total_bets);
    output::field("Payouts", settlement.total_payouts);
    output::field("Settled at", settlement.settled_at.to_rfc3339());
}

fn print_report(report: &SweepReport) {
    if report.skipped {
        output::warning("Another sweep is already running");
        return;
    }
    if report.candidates == 0 {
        output::note("No resolved events awaiting settlement");
        return;
    }

    output::section("Settlement sweep");
    for settlement in &report.settled {
        output::success(&format!(
            "{} → '{}' ({} bets, {} paid)",
            settlement.event_id,
            settlement.resolved_outcome,
            settlement.total_bets,
            settlement.total_payouts
        ));
    }
    if report.already_settled > 0 {
        output::note(&format!(
            "{} event(s) were settled concurrently",
            report.already_settled
        ));
    }
    for failure in &report.failed {
        output::warning(&format!("{}: {}", failure.event_id, failure.error));
    }
    if !report.rankings_refreshed {
        output::warning("Rankings were not refreshed");
    }
}
