//! Ledger database configuration.

use serde::Deserialize;

use crate::adapter::outbound::sqlite::PoolOptions;

/// SQLite connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file. Overridden by `DATABASE_URL`.
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// How long a writer waits for the database lock before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,
}

fn default_url() -> String {
    "wagerbook.db".to_string()
}

const fn default_pool_size() -> u32 {
    5
}

const fn default_busy_timeout_ms() -> u32 {
    5_000
}

impl DatabaseConfig {
    #[must_use]
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_size: self.pool_size,
            busy_timeout_ms: self.busy_timeout_ms,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            pool_size: default_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}
