//! Handlers for the `account`, `adjust` and `audit` commands.

use serde_json::json;

use crate::adapter::inbound::cli::command::{AccountArgs, AdjustArgs, UserArg};
use crate::adapter::inbound::cli::output;
use crate::domain::{User, UserId};
use crate::error::{LedgerError, Result};
use crate::infrastructure::bootstrap::Services;
use crate::port::outbound::ledger::LedgerStore;

/// Execute `account <user> [--name]`.
pub fn execute_account<S: LedgerStore>(services: &Services<S>, args: &AccountArgs) -> Result<()> {
    let user_id = UserId::new(&args.user);
    let name = args.name.as_deref().unwrap_or(&args.user);
    let user = services.accounts.open_account(&user_id, name)?;

    if output::is_json() {
        return output::json_output("account", json!({ "user": user }));
    }
    print_user(&user);
    Ok(())
}

/// Execute `adjust <user> <amount>`.
pub fn execute_adjust<S: LedgerStore>(services: &Services<S>, args: &AdjustArgs) -> Result<()> {
    let user = services
        .accounts
        .adjust_balance(&UserId::new(&args.user), args.amount)?;

    if output::is_json() {
        return output::json_output(
            "adjust",
            json!({ "delta": args.amount, "user": user }),
        );
    }
    output::success(&format!(
        "Adjusted {} by {}",
        user.id,
        output::signed(args.amount)
    ));
    output::field("Balance", user.balance);
    Ok(())
}

/// Execute `audit <user>`.
///
/// An inconsistent ledger is reported as an error so scripts can alert on
/// the exit status.
pub fn execute_audit<S: LedgerStore>(services: &Services<S>, args: &UserArg) -> Result<()> {
    let audit = services.accounts.audit(&UserId::new(&args.user))?;
    let consistent = audit.is_consistent();

    if output::is_json() {
        output::json_output(
            "audit",
            json!({ "consistent": consistent, "audit": audit }),
        )?;
    } else {
        output::section(&format!("Ledger audit: {}", audit.user_id));
        output::field("Entries", audit.entries);
        output::field("Replayed", audit.replayed_balance);
        output::field("Balance", audit.balance);
        output::field("Escrowed", audit.frozen_balance);
        output::field("Pending", audit.pending_stake);
        if consistent {
            output::success("Ledger is consistent");
        }
    }

    if consistent {
        Ok(())
    } else {
        Err(LedgerError::LedgerDrift {
            user_id: audit.user_id,
        }
        .into())
    }
}

fn print_user(user: &User) {
    output::section(&format!("{} ({})", user.display_name, user.id));
    output::field("Balance", user.balance);
    output::field("Escrowed", user.frozen_balance);
    output::field("Total assets", user.total_assets());
    output::field("Bets", user.total_bets);
    output::field("Wins", user.total_wins);
    output::field("Streak", format!("{} (best {})", user.current_streak, user.max_streak));
}
