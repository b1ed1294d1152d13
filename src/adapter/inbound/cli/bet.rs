//! Handler for the `bet` command.

use serde_json::json;

use crate::adapter::inbound::cli::command::BetArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::{EventId, UserId};
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;
use crate::port::outbound::ledger::LedgerStore;

/// Execute `bet <user> <event> <outcome> <amount>`.
pub fn execute<S: LedgerStore>(services: &Services<S>, args: &BetArgs) -> Result<()> {
    let user_id = UserId::new(&args.user);
    let bet = services.bets.place_bet(
        &user_id,
        &EventId::new(&args.event),
        &args.outcome,
        args.amount,
    )?;

    if output::is_json() {
        return output::json_output("bet", json!({ "bet": bet }));
    }

    output::success(&format!("Bet {} placed", bet.id));
    output::field("Outcome", &bet.outcome);
    output::field("Stake", bet.amount);
    output::field("Odds", bet.locked_odds);
    output::field("Payout if won", bet.potential_payout);

    let user = services.accounts.user(&user_id)?;
    output::field("Balance", user.balance);
    output::field("Escrowed", output::muted(user.frozen_balance));
    Ok(())
}
