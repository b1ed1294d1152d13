//! Handler for the `run` command.

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration;

/// Execute the run command: start the settlement daemon in the foreground.
pub async fn execute(config: Config) -> Result<()> {
    print_startup_config(&config);
    orchestration::run(config).await
}

fn print_startup_config(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Database", &config.database.url);
    if !config.settlement.enabled {
        output::warning("Settlement scheduler disabled; nothing to run");
        return;
    }
    output::field("Sweep every", format!("{}s", config.settlement.interval_secs));
    output::field("Startup sweep", config.settlement.run_on_startup);
    output::note("Press Ctrl-C to stop");
}
