//! Temporary file-backed ledgers.
//!
//! Each connection to `:memory:` opens its own database, so tests that
//! exercise the pool use a real file in the temp directory instead.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::adapter::outbound::sqlite::{PoolOptions, SqliteLedger};
use crate::application::RankingPolicy;
use crate::domain::{Event, EventListing, User, UserId};
use crate::infrastructure::bootstrap::Services;
use crate::port::outbound::ledger::LedgerStore;

use super::faulty::FaultyStore;

/// Temporary SQLite ledger, removed (with its WAL files) on drop.
pub struct TempLedger {
    path: PathBuf,
    ledger: Arc<SqliteLedger>,
}

impl TempLedger {
    pub fn create(name: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("wagerbook-{name}-{nanos}.db"));
        let ledger = SqliteLedger::open(&path.display().to_string(), PoolOptions::default())
            .expect("open temp ledger");
        Self {
            path,
            ledger: Arc::new(ledger),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> Arc<SqliteLedger> {
        Arc::clone(&self.ledger)
    }

    /// Services with the default ranking policy.
    pub fn services(&self) -> Services<SqliteLedger> {
        self.services_with(RankingPolicy::default())
    }

    pub fn services_with(&self, policy: RankingPolicy) -> Services<SqliteLedger> {
        Services::with_policy(self.store(), policy)
    }

    /// Services running through a [`FaultyStore`] over this ledger.
    pub fn faulty_services(
        &self,
    ) -> (Arc<FaultyStore<SqliteLedger>>, Services<FaultyStore<SqliteLedger>>) {
        let store = Arc::new(FaultyStore::new(self.store()));
        let services = Services::with_policy(Arc::clone(&store), RankingPolicy::default());
        (store, services)
    }
}

impl Drop for TempLedger {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}

/// Open an account with the policy's starting credits.
pub fn seed_user<S: LedgerStore>(services: &Services<S>, id: &str) -> User {
    services
        .accounts
        .open_account(&UserId::new(id), id)
        .expect("seed user")
}

/// Open an account and correct its balance to exactly `balance`.
pub fn seed_user_with<S: LedgerStore>(services: &Services<S>, id: &str, balance: i64) -> User {
    let user = seed_user(services, id);
    let delta = balance - user.balance;
    if delta == 0 {
        return user;
    }
    services
        .accounts
        .adjust_balance(&user.id, delta)
        .expect("seed balance")
}

/// Publish `listing` as a new open event.
pub fn seed_event<S: LedgerStore>(services: &Services<S>, listing: EventListing) -> Event {
    let id = listing.id.clone();
    services.feed.publish_event(listing).expect("seed event");
    services.feed.event(&id).expect("load seeded event")
}
