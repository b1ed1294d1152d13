//! Daemon runtime lifecycle.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::application::scheduler::{SchedulerConfig, SettlementScheduler};
use crate::application::settlement::SettlementEngine;
use crate::error::Result;
use crate::infrastructure::bootstrap::build_services;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::ledger::LedgerStore;

/// Run the settlement daemon until Ctrl-C.
pub async fn run(config: Config) -> Result<()> {
    if !config.settlement.enabled {
        info!("Settlement scheduler disabled by configuration");
        return Ok(());
    }

    let services = build_services(&config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
        let _ = shutdown_tx.send(true);
    });

    run_with_shutdown(
        Arc::clone(&services.settlement),
        SchedulerConfig::from(&config.settlement),
        shutdown_rx,
    )
    .await
}

/// Drive the scheduler until `shutdown` flips to `true` or its sender is
/// dropped, then wait for any in-flight sweep to finish.
pub async fn run_with_shutdown<S: LedgerStore + 'static>(
    engine: Arc<SettlementEngine<S>>,
    scheduler: SchedulerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let (handle, mut reports) = SettlementScheduler::new(engine, scheduler).start();
    info!("Settlement daemon running");

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                let stop = changed.is_err() || *shutdown.borrow();
                if stop {
                    break;
                }
            }
            Some(report) = reports.recv() => {
                if !report.failed.is_empty() {
                    warn!(
                        failed = report.failed.len(),
                        settled = report.settled_count(),
                        "Sweep finished with failures; they will be retried"
                    );
                }
            }
        }
    }

    handle.shutdown().await;
    info!("Settlement daemon stopped");
    Ok(())
}
