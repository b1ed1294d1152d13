//! CLI module graph.

pub mod account;
pub mod bet;
pub mod command;
pub mod event;
pub mod output;
pub mod rankings;
pub mod run;
pub mod settle;
pub mod stats;

use crate::error::Result;
use crate::infrastructure::bootstrap::build_services;
use crate::infrastructure::config::settings::Config;
use command::Commands;

/// Dispatch a parsed command against the configured ledger.
pub async fn execute(command: &Commands, config: Config) -> Result<()> {
    if let Commands::Run = command {
        return run::execute(config).await;
    }

    let services = build_services(&config)?;
    match command {
        Commands::Run => Ok(()),
        Commands::Sweep => settle::execute_sweep(&services),
        Commands::Settle(args) => settle::execute_settle(&services, args),
        Commands::Bet(args) => bet::execute(&services, args),
        Commands::Rankings(args) => rankings::execute(&services, args),
        Commands::Stats => stats::execute(&services),
        Commands::Audit(args) => account::execute_audit(&services, args),
        Commands::Adjust(args) => account::execute_adjust(&services, args),
        Commands::Account(args) => account::execute_account(&services, args),
        Commands::Event(command) => event::execute(&services, command),
    }
}
