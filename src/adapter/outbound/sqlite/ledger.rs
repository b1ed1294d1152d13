//! SQLite ledger store.
//!
//! Implements the [`LedgerStore`] port on a Diesel connection pool. Atomic
//! units run inside `BEGIN IMMEDIATE`, which takes the database write lock
//! up front; concurrent writers queue on the busy timeout.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sql_types::{BigInt, Text};
use diesel::SqliteConnection;
use tracing::debug;

use crate::adapter::outbound::sqlite::database::connection::{
    create_pool, enable_wal, run_migrations, DbPool, PoolOptions,
};
use crate::adapter::outbound::sqlite::database::model::{
    encode_time, BetRow, EventRow, NewRankingRow, NewSettlementRow, NewTransactionRow, RankingRow,
    SettlementRow, TransactionRow, UserRow,
};
use crate::adapter::outbound::sqlite::database::schema::{
    bets, credit_transactions, events, rankings, settlements, users,
};
use crate::domain::{
    Bet, BetId, BetStatus, CreditTransaction, Credits, DashboardStats, Event, EventId,
    EventStatus, NewCreditTransaction, Ranking, RankingPeriod, Settlement, User, UserId,
};
use crate::error::{Error, LedgerError, Result};
use crate::port::outbound::ledger::{LedgerStore, LedgerTx, LedgerView};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    #[diesel(column_name = "id")]
    id: i64,
}

#[derive(QueryableByName)]
struct Total {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

#[derive(QueryableByName)]
struct StatsRow {
    #[diesel(sql_type = BigInt)]
    total_users: i64,
    #[diesel(sql_type = BigInt)]
    total_bets: i64,
    #[diesel(sql_type = BigInt)]
    open_events: i64,
    #[diesel(sql_type = BigInt)]
    total_volume: i64,
    #[diesel(sql_type = BigInt)]
    pending_bets: i64,
    #[diesel(sql_type = BigInt)]
    settled_events: i64,
}

const DASHBOARD_SQL: &str = "SELECT \
    (SELECT COUNT(*) FROM users) AS total_users, \
    (SELECT COUNT(*) FROM bets) AS total_bets, \
    (SELECT COUNT(*) FROM events WHERE status = 'open') AS open_events, \
    (SELECT CAST(COALESCE(SUM(amount), 0) AS INTEGER) FROM bets) AS total_volume, \
    (SELECT COUNT(*) FROM bets WHERE status = 'pending') AS pending_bets, \
    (SELECT COUNT(*) FROM settlements) AS settled_events";

const PENDING_STAKE_SQL: &str = "SELECT CAST(COALESCE(SUM(amount), 0) AS INTEGER) AS total \
    FROM bets WHERE user_id = ? AND status = 'pending'";

fn last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64> {
    let row = diesel::sql_query("SELECT last_insert_rowid() AS id")
        .get_result::<LastInsertRowId>(conn)?;
    Ok(row.id)
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// SQLite-backed ledger.
#[derive(Clone)]
pub struct SqliteLedger {
    pool: DbPool,
}

impl SqliteLedger {
    /// Wrap an existing, migrated pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database at `database_url`, enable WAL and apply
    /// pending migrations.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be built or migrations fail.
    pub fn open(database_url: &str, options: PoolOptions) -> Result<Self> {
        let pool = create_pool(database_url, options)?;
        enable_wal(&pool)?;
        run_migrations(&pool)?;
        debug!(url = %database_url, pool_size = options.max_size, "Ledger database ready");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        Ok(self.pool.get()?)
    }
}

impl LedgerStore for SqliteLedger {
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LedgerTx) -> Result<T>,
    {
        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| {
            let mut tx = SqliteLedgerTx { conn };
            f(&mut tx)
        })
    }
}

impl LedgerView for SqliteLedger {
    fn user(&self, id: &UserId) -> Result<Option<User>> {
        let mut conn = self.conn()?;
        users::table
            .find(id.as_str())
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(User::try_from)
            .transpose()
    }

    fn event(&self, id: &EventId) -> Result<Option<Event>> {
        let mut conn = self.conn()?;
        events::table
            .find(id.as_str())
            .select(EventRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Event::try_from)
            .transpose()
    }

    fn bet(&self, id: &BetId) -> Result<Option<Bet>> {
        let mut conn = self.conn()?;
        bets::table
            .find(id.as_str())
            .select(BetRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Bet::try_from)
            .transpose()
    }

    fn bets_for_user(&self, user_id: &UserId, status: Option<BetStatus>) -> Result<Vec<Bet>> {
        let mut conn = self.conn()?;
        let mut query = bets::table
            .filter(bets::user_id.eq(user_id.as_str()))
            .select(BetRow::as_select())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(bets::status.eq(status.as_str()));
        }
        let rows = query
            .order((bets::created_at.desc(), bets::id.desc()))
            .load(&mut conn)?;
        convert_all(rows)
    }

    fn pending_stake(&self, user_id: &UserId) -> Result<Credits> {
        let mut conn = self.conn()?;
        let row = diesel::sql_query(PENDING_STAKE_SQL)
            .bind::<Text, _>(user_id.as_str())
            .get_result::<Total>(&mut conn)?;
        Ok(row.total)
    }

    fn settlement_for_event(&self, event_id: &EventId) -> Result<Option<Settlement>> {
        let mut conn = self.conn()?;
        settlements::table
            .filter(settlements::event_id.eq(event_id.as_str()))
            .select(SettlementRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Settlement::try_from)
            .transpose()
    }

    fn recent_settlements(&self, limit: i64) -> Result<Vec<Settlement>> {
        let mut conn = self.conn()?;
        let rows = settlements::table
            .select(SettlementRow::as_select())
            .order((settlements::settled_at.desc(), settlements::id.desc()))
            .limit(limit)
            .load(&mut conn)?;
        convert_all(rows)
    }

    fn transactions_for_user(&self, user_id: &UserId) -> Result<Vec<CreditTransaction>> {
        let mut conn = self.conn()?;
        let rows = credit_transactions::table
            .filter(credit_transactions::user_id.eq(user_id.as_str()))
            .select(TransactionRow::as_select())
            .order(credit_transactions::id.asc())
            .load(&mut conn)?;
        convert_all(rows)
    }

    fn rankings(&self, period: RankingPeriod) -> Result<Vec<Ranking>> {
        let mut conn = self.conn()?;
        let rows = rankings::table
            .filter(rankings::period.eq(period.as_str()))
            .select(RankingRow::as_select())
            .order(rankings::rank_position.asc())
            .load(&mut conn)?;
        convert_all(rows)
    }

    fn unsettled_resolved_events(&self) -> Result<Vec<Event>> {
        let mut conn = self.conn()?;
        let rows = events::table
            .filter(events::status.eq(EventStatus::Resolved.as_str()))
            .filter(events::resolved_outcome.is_not_null())
            .filter(events::id.ne_all(settlements::table.select(settlements::event_id)))
            .select(EventRow::as_select())
            .order((events::resolved_at.asc(), events::id.asc()))
            .load(&mut conn)?;
        convert_all(rows)
    }

    fn dashboard_stats(&self) -> Result<DashboardStats> {
        let mut conn = self.conn()?;
        let row = diesel::sql_query(DASHBOARD_SQL).get_result::<StatsRow>(&mut conn)?;
        Ok(DashboardStats {
            total_users: row.total_users,
            total_bets: row.total_bets,
            open_events: row.open_events,
            total_volume: row.total_volume,
            pending_bets: row.pending_bets,
            settled_events: row.settled_events,
        })
    }
}

/// Handle to an open `BEGIN IMMEDIATE` transaction.
pub struct SqliteLedgerTx<'c> {
    conn: &'c mut SqliteConnection,
}

impl SqliteLedgerTx<'_> {
    fn conn(&mut self) -> &mut SqliteConnection {
        self.conn
    }
}

impl LedgerTx for SqliteLedgerTx<'_> {
    fn user_for_update(&mut self, id: &UserId) -> Result<Option<User>> {
        users::table
            .find(id.as_str())
            .select(UserRow::as_select())
            .first(self.conn())
            .optional()?
            .map(User::try_from)
            .transpose()
    }

    fn insert_user(&mut self, user: &User) -> Result<()> {
        diesel::insert_into(users::table)
            .values(UserRow::from(user))
            .execute(self.conn())?;
        Ok(())
    }

    fn update_user(&mut self, user: &User) -> Result<()> {
        let updated = diesel::update(users::table.find(user.id.as_str()))
            .set(UserRow::from(user))
            .execute(self.conn())?;
        if updated == 0 {
            return Err(LedgerError::user_not_found(&user.id).into());
        }
        Ok(())
    }

    fn event(&mut self, id: &EventId) -> Result<Option<Event>> {
        events::table
            .find(id.as_str())
            .select(EventRow::as_select())
            .first(self.conn())
            .optional()?
            .map(Event::try_from)
            .transpose()
    }

    fn insert_event(&mut self, event: &Event) -> Result<()> {
        diesel::insert_into(events::table)
            .values(EventRow::try_from(event)?)
            .execute(self.conn())?;
        Ok(())
    }

    fn update_event(&mut self, event: &Event) -> Result<()> {
        let row = EventRow::try_from(event)?;
        let updated = diesel::update(events::table.find(event.id.as_str()))
            .set(row)
            .execute(self.conn())?;
        if updated == 0 {
            return Err(LedgerError::event_not_found(&event.id).into());
        }
        Ok(())
    }

    fn insert_bet(&mut self, bet: &Bet) -> Result<()> {
        diesel::insert_into(bets::table)
            .values(BetRow::from(bet))
            .execute(self.conn())?;
        Ok(())
    }

    fn update_bet(&mut self, bet: &Bet) -> Result<()> {
        let updated = diesel::update(bets::table.find(bet.id.as_str()))
            .set((
                bets::status.eq(bet.status.as_str()),
                bets::payout.eq(bet.payout),
                bets::settled_at.eq(bet.settled_at.map(encode_time)),
            ))
            .execute(self.conn())?;
        if updated == 0 {
            return Err(LedgerError::bet_not_found(&bet.id).into());
        }
        Ok(())
    }

    fn pending_bets_for_event(&mut self, event_id: &EventId) -> Result<Vec<Bet>> {
        let rows = bets::table
            .filter(bets::event_id.eq(event_id.as_str()))
            .filter(bets::status.eq(BetStatus::Pending.as_str()))
            .select(BetRow::as_select())
            .order((bets::created_at.asc(), bets::id.asc()))
            .load(self.conn())?;
        convert_all(rows)
    }

    fn settlement_exists(&mut self, event_id: &EventId) -> Result<bool> {
        let exists = diesel::select(diesel::dsl::exists(
            settlements::table.filter(settlements::event_id.eq(event_id.as_str())),
        ))
        .get_result::<bool>(self.conn())?;
        Ok(exists)
    }

    fn insert_settlement(&mut self, settlement: &Settlement) -> Result<i64> {
        diesel::insert_into(settlements::table)
            .values(NewSettlementRow::from(settlement))
            .execute(self.conn())?;
        last_insert_rowid(self.conn())
    }

    fn append_transaction(&mut self, entry: &NewCreditTransaction) -> Result<i64> {
        diesel::insert_into(credit_transactions::table)
            .values(NewTransactionRow::from(entry))
            .execute(self.conn())?;
        last_insert_rowid(self.conn())
    }

    fn users_with_bets(&mut self) -> Result<Vec<User>> {
        let rows = users::table
            .filter(users::total_bets.gt(0))
            .select(UserRow::as_select())
            .order(users::id.asc())
            .load(self.conn())?;
        convert_all(rows)
    }

    fn lost_bet_counts(&mut self) -> Result<HashMap<UserId, i64>> {
        let counts: Vec<(String, i64)> = bets::table
            .filter(bets::status.eq(BetStatus::Lost.as_str()))
            .group_by(bets::user_id)
            .select((bets::user_id, diesel::dsl::count_star()))
            .load(self.conn())?;
        Ok(counts
            .into_iter()
            .map(|(user_id, count)| (UserId::from(user_id), count))
            .collect())
    }

    fn settled_bets_since(&mut self, since: DateTime<Utc>) -> Result<Vec<Bet>> {
        let rows = bets::table
            .filter(bets::status.eq_any([BetStatus::Won.as_str(), BetStatus::Lost.as_str()]))
            .filter(bets::settled_at.ge(encode_time(since)))
            .select(BetRow::as_select())
            .order((bets::user_id.asc(), bets::settled_at.asc()))
            .load(self.conn())?;
        convert_all(rows)
    }

    fn replace_rankings(&mut self, period: RankingPeriod, rows: &[Ranking]) -> Result<()> {
        diesel::delete(rankings::table.filter(rankings::period.eq(period.as_str())))
            .execute(self.conn())?;
        if rows.is_empty() {
            return Ok(());
        }
        let rows: Vec<NewRankingRow> = rows.iter().map(NewRankingRow::from).collect();
        diesel::insert_into(rankings::table)
            .values(&rows)
            .execute(self.conn())?;
        Ok(())
    }
}
