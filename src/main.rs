use clap::Parser;
use tracing::info;

use wagerbook::adapter::inbound::cli::command::Cli;
use wagerbook::adapter::inbound::cli::output::{self, OutputConfig};
use wagerbook::adapter::inbound::cli;
use wagerbook::infrastructure::config::settings::Config;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let args = Cli::parse();
    output::configure(OutputConfig::new(args.json, args.quiet));

    let config = match Config::load_or_default(&args.config) {
        Ok(c) => c,
        Err(e) => {
            output::error(&format!("Failed to load config: {e}"));
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!(command = ?args.command, "wagerbook starting");

    if let Err(e) = cli::execute(&args.command, config).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
