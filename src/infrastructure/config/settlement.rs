//! Settlement scheduler configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::scheduler::SchedulerConfig;

/// Scheduled sweep settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// Run the scheduler in daemon mode.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Seconds between sweeps (default: 300).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Sweep once at startup before the first interval elapses.
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
}

const fn default_enabled() -> bool {
    true
}

const fn default_interval_secs() -> u64 {
    300
}

const fn default_run_on_startup() -> bool {
    true
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval_secs(),
            run_on_startup: default_run_on_startup(),
        }
    }
}

impl From<&SettlementConfig> for SchedulerConfig {
    fn from(config: &SettlementConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            run_on_startup: config.run_on_startup,
        }
    }
}
