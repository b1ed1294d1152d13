//! Command-line interface definitions.
//!
//! Defines the CLI structure for the wagerbook application using `clap`.
//! Every command operates on the ledger named by the configuration file.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::RankingPeriod;

/// Play-money prediction market ledger and settlement CLI
#[derive(Parser, Debug)]
#[command(name = "wagerbook")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (defaults apply if it does not exist)
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the wagerbook CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the settlement daemon until Ctrl-C
    Run,

    /// Settle every resolved, unsettled event once
    Sweep,

    /// Resolve an event and settle it immediately
    Settle(SettleArgs),

    /// Place a bet
    Bet(BetArgs),

    /// Show (and optionally recompute) rankings
    Rankings(RankingsArgs),

    /// Show dashboard statistics
    Stats,

    /// Replay a user's credit ledger and check it against stored balances
    Audit(UserArg),

    /// Apply a signed balance correction
    Adjust(AdjustArgs),

    /// Open an account, or show an existing one
    Account(AccountArgs),

    /// Publish events and resolutions
    #[command(subcommand)]
    Event(EventCommand),
}

/// Subcommands for `wagerbook event`.
#[derive(Subcommand, Debug)]
pub enum EventCommand {
    /// Insert a new open event or refresh an existing one.
    Publish(PublishArgs),
    /// Mark an event resolved; settlement happens on the next sweep.
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
pub struct UserArg {
    /// User ID.
    pub user: String,
}

#[derive(Args, Debug)]
pub struct SettleArgs {
    /// Event ID.
    pub event: String,
    /// Winning outcome label (case-insensitive).
    pub outcome: String,
}

#[derive(Args, Debug)]
pub struct BetArgs {
    pub user: String,
    pub event: String,
    /// Outcome label to back (case-insensitive).
    pub outcome: String,
    /// Stake in credits.
    pub amount: i64,
}

#[derive(Args, Debug)]
pub struct RankingsArgs {
    /// Ranking period [all-time, weekly, monthly].
    #[arg(short, long, default_value = "all_time")]
    pub period: RankingPeriod,

    /// Recompute every period before displaying.
    #[arg(long)]
    pub recalculate: bool,
}

#[derive(Args, Debug)]
pub struct AdjustArgs {
    pub user: String,
    /// Signed credit delta, e.g. 500 or -200.
    #[arg(allow_negative_numbers = true)]
    pub amount: i64,
}

#[derive(Args, Debug)]
pub struct AccountArgs {
    pub user: String,
    /// Display name for a new account (defaults to the user ID).
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Event ID.
    pub event: String,

    #[arg(long)]
    pub question: String,

    #[arg(long)]
    pub category: Option<String>,

    /// Outcome label; repeat once per outcome.
    #[arg(long = "outcome", required = true)]
    pub outcomes: Vec<String>,

    /// Decimal price; repeat once per outcome, in the same order.
    #[arg(long = "price")]
    pub prices: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    pub event: String,
    pub outcome: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bet() {
        let cli = Cli::try_parse_from(["wagerbook", "bet", "alice", "ev-1", "yes", "100"]).unwrap();
        match cli.command {
            Commands::Bet(args) => {
                assert_eq!(args.user, "alice");
                assert_eq!(args.event, "ev-1");
                assert_eq!(args.outcome, "yes");
                assert_eq!(args.amount, 100);
            }
            other => panic!("Expected Bet command, got {other:?}"),
        }
    }

    #[test]
    fn adjust_accepts_negative_amounts() {
        let cli = Cli::try_parse_from(["wagerbook", "adjust", "alice", "-250"]).unwrap();
        match cli.command {
            Commands::Adjust(args) => assert_eq!(args.amount, -250),
            other => panic!("Expected Adjust command, got {other:?}"),
        }
    }

    #[test]
    fn rankings_defaults_to_all_time() {
        let cli = Cli::try_parse_from(["wagerbook", "rankings"]).unwrap();
        match cli.command {
            Commands::Rankings(args) => {
                assert_eq!(args.period, RankingPeriod::AllTime);
                assert!(!args.recalculate);
            }
            other => panic!("Expected Rankings command, got {other:?}"),
        }
    }

    #[test]
    fn rankings_period_accepts_aliases() {
        let cli =
            Cli::try_parse_from(["wagerbook", "rankings", "--period", "weekly", "--recalculate"])
                .unwrap();
        match cli.command {
            Commands::Rankings(args) => {
                assert_eq!(args.period, RankingPeriod::Weekly);
                assert!(args.recalculate);
            }
            other => panic!("Expected Rankings command, got {other:?}"),
        }
    }

    #[test]
    fn event_publish_collects_repeated_flags() {
        let cli = Cli::try_parse_from([
            "wagerbook",
            "event",
            "publish",
            "ev-1",
            "--question",
            "Will it rain?",
            "--outcome",
            "Yes",
            "--outcome",
            "No",
            "--price",
            "0.6",
            "--price",
            "0.4",
        ])
        .unwrap();
        match cli.command {
            Commands::Event(EventCommand::Publish(args)) => {
                assert_eq!(args.outcomes, vec!["Yes", "No"]);
                assert_eq!(args.prices, vec!["0.6", "0.4"]);
                assert!(args.category.is_none());
            }
            other => panic!("Expected Event Publish command, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_command() {
        let cli =
            Cli::try_parse_from(["wagerbook", "stats", "--json", "--config", "alt.toml"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
    }

    #[test]
    fn config_defaults_to_local_file() {
        let cli = Cli::try_parse_from(["wagerbook", "sweep"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert!(!cli.json);
    }

    #[test]
    fn non_numeric_amount_fails() {
        let result = Cli::try_parse_from(["wagerbook", "bet", "alice", "ev-1", "yes", "lots"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_subcommand_fails() {
        assert!(Cli::try_parse_from(["wagerbook"]).is_err());
    }
}
