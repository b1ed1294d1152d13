//! Settlement scheduler.
//!
//! Background task that runs a settlement sweep on a fixed interval.
//!
//! ```text
//! interval tick --> spawn_blocking(SettlementEngine::run_sweep)
//!                              |
//!                              v
//!                     mpsc::Receiver<SweepReport>
//! ```
//!
//! Sweeps run on the blocking pool and never overlap. Shutdown is observed
//! between sweeps, so a running sweep always finishes its current event
//! before the task exits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::application::settlement::{SettlementEngine, SweepReport};
use crate::port::outbound::ledger::LedgerStore;

/// Scheduler timing.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub interval: Duration,
    /// Sweep once immediately instead of waiting a full interval.
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            run_on_startup: true,
        }
    }
}

/// Handle for controlling the scheduler lifecycle.
pub struct SchedulerHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the scheduler to stop and wait for it to exit, including any
    /// sweep in flight.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            error!(error = %e, "Settlement scheduler task failed");
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

pub struct SettlementScheduler<S> {
    engine: Arc<SettlementEngine<S>>,
    config: SchedulerConfig,
}

impl<S: LedgerStore + 'static> SettlementScheduler<S> {
    pub fn new(engine: Arc<SettlementEngine<S>>, config: SchedulerConfig) -> Self {
        Self { engine, config }
    }

    /// Start the scheduler on the current tokio runtime.
    ///
    /// Returns a handle for lifecycle control and a channel of sweep
    /// reports. Reports are dropped when the channel is full or closed; the
    /// scheduler keeps running either way.
    pub fn start(self) -> (SchedulerHandle, mpsc::Receiver<SweepReport>) {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (report_tx, report_rx) = mpsc::channel::<SweepReport>(16);
        let Self { engine, config } = self;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            if !config.run_on_startup {
                // The first tick completes immediately.
                ticker.tick().await;
            }
            info!(
                interval_secs = config.interval.as_secs(),
                run_on_startup = config.run_on_startup,
                "Settlement scheduler started"
            );

            loop {
                tokio::select! {
                    biased;

                    _ = shutdown_rx.recv() => {
                        info!("Settlement scheduler shutting down");
                        break;
                    }

                    _ = ticker.tick() => {
                        let engine = Arc::clone(&engine);
                        match tokio::task::spawn_blocking(move || engine.run_sweep()).await {
                            Ok(Ok(report)) => {
                                if report_tx.try_send(report).is_err() {
                                    debug!("Sweep report not delivered");
                                }
                            }
                            Ok(Err(e)) => warn!(error = %e, "Settlement sweep failed"),
                            Err(e) => error!(error = %e, "Settlement sweep panicked"),
                        }
                    }
                }
            }
        });

        (SchedulerHandle { shutdown_tx, task }, report_rx)
    }
}
