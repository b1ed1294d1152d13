//! Composition root: wires the ledger store into the application services.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::sqlite::SqliteLedger;
use crate::application::{
    AccountService, BetLedger, EventFeed, RankingCalculator, RankingPolicy, SettlementEngine,
};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::ledger::LedgerStore;

/// Every service of the wagering core, sharing one store.
pub struct Services<S> {
    pub store: Arc<S>,
    pub accounts: AccountService<S>,
    pub bets: BetLedger<S>,
    pub feed: EventFeed<S>,
    pub rankings: RankingCalculator<S>,
    pub settlement: Arc<SettlementEngine<S>>,
}

impl<S: LedgerStore> Services<S> {
    /// Build the services around `store` with an explicit ranking policy.
    pub fn with_policy(store: Arc<S>, policy: RankingPolicy) -> Self {
        let rankings = RankingCalculator::new(Arc::clone(&store), policy);
        let settlement = Arc::new(SettlementEngine::new(Arc::clone(&store), rankings.clone()));
        Self {
            accounts: AccountService::new(Arc::clone(&store), policy.starting_credits),
            bets: BetLedger::new(Arc::clone(&store)),
            feed: EventFeed::new(Arc::clone(&store)),
            rankings,
            settlement,
            store,
        }
    }

    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self::with_policy(store, config.ranking_policy())
    }
}

/// Open the configured SQLite ledger, applying migrations.
///
/// # Errors
/// Returns an error if the database cannot be opened or migrated.
pub fn open_ledger(config: &Config) -> Result<Arc<SqliteLedger>> {
    let ledger = SqliteLedger::open(&config.database.url, config.database.pool_options())?;
    info!(database = %config.database.url, "Database initialized");
    Ok(Arc::new(ledger))
}

/// Open the configured ledger and build every service on top of it.
///
/// # Errors
/// Returns an error if the database cannot be opened or migrated.
pub fn build_services(config: &Config) -> Result<Services<SqliteLedger>> {
    let store = open_ledger(config)?;
    Ok(Services::new(store, config))
}
