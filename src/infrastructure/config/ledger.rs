//! Ledger and leaderboard configuration.

use serde::Deserialize;

use crate::application::ranking::RankingPolicy;
use crate::domain::Credits;

/// Account funding rules.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Credits granted to every new account.
    #[serde(default = "default_starting_credits")]
    pub starting_credits: Credits,
}

const fn default_starting_credits() -> Credits {
    10_000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            starting_credits: default_starting_credits(),
        }
    }
}

/// Leaderboard windows, in days.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_weekly_days")]
    pub weekly_days: i64,
    #[serde(default = "default_monthly_days")]
    pub monthly_days: i64,
}

const fn default_weekly_days() -> i64 {
    7
}

const fn default_monthly_days() -> i64 {
    30
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weekly_days: default_weekly_days(),
            monthly_days: default_monthly_days(),
        }
    }
}

impl RankingConfig {
    #[must_use]
    pub fn policy(&self, ledger: &LedgerConfig) -> RankingPolicy {
        RankingPolicy {
            starting_credits: ledger.starting_credits,
            weekly_days: self.weekly_days,
            monthly_days: self.monthly_days,
        }
    }
}
