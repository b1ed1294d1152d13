//! Database model types for Diesel ORM.
//!
//! Timestamps are stored as RFC 3339 text in UTC with a fixed precision so
//! that lexicographic comparison in SQL matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use super::schema::{bets, credit_transactions, events, rankings, settlements, users};
use crate::domain::{
    Bet, BetId, CreditTransaction, Event, EventId, NewCreditTransaction, Ranking, Settlement,
    User, UserId,
};
use crate::error::{Error, Result};

/// Format a timestamp for storage.
#[must_use]
pub fn encode_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
pub fn decode_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("timestamp '{raw}': {e}")))
}

fn decode_opt_time(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(decode_time).transpose()
}

fn decode_enum<T: std::str::FromStr<Err = String>>(raw: &str) -> Result<T> {
    raw.parse().map_err(Error::Parse)
}

/// Database row for a user.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: String,
    pub display_name: String,
    pub balance: i64,
    pub frozen_balance: i64,
    pub total_bets: i32,
    pub total_wins: i32,
    pub current_streak: i32,
    pub max_streak: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            display_name: user.display_name.clone(),
            balance: user.balance,
            frozen_balance: user.frozen_balance,
            total_bets: user.total_bets,
            total_wins: user.total_wins,
            current_streak: user.current_streak,
            max_streak: user.max_streak,
            created_at: encode_time(user.created_at),
            updated_at: encode_time(user.updated_at),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: UserId::from(row.id),
            display_name: row.display_name,
            balance: row.balance,
            frozen_balance: row.frozen_balance,
            total_bets: row.total_bets,
            total_wins: row.total_wins,
            current_streak: row.current_streak,
            max_streak: row.max_streak,
            created_at: decode_time(&row.created_at)?,
            updated_at: decode_time(&row.updated_at)?,
        })
    }
}

/// Database row for an event. Labels and prices are JSON arrays.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct EventRow {
    pub id: String,
    pub question: String,
    pub category: Option<String>,
    pub outcomes: String,
    pub outcome_prices: String,
    pub status: String,
    pub resolved_outcome: Option<String>,
    pub resolved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<&Event> for EventRow {
    type Error = Error;

    fn try_from(event: &Event) -> Result<Self> {
        Ok(Self {
            id: event.id.to_string(),
            question: event.question.clone(),
            category: event.category.clone(),
            outcomes: serde_json::to_string(&event.outcomes)?,
            outcome_prices: serde_json::to_string(&event.outcome_prices)?,
            status: event.status.as_str().to_string(),
            resolved_outcome: event.resolved_outcome.clone(),
            resolved_at: event.resolved_at.map(encode_time),
            created_at: encode_time(event.created_at),
            updated_at: encode_time(event.updated_at),
        })
    }
}

impl TryFrom<EventRow> for Event {
    type Error = Error;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(Self {
            id: EventId::from(row.id),
            question: row.question,
            category: row.category,
            outcomes: serde_json::from_str(&row.outcomes)?,
            outcome_prices: serde_json::from_str(&row.outcome_prices)?,
            status: decode_enum(&row.status)?,
            resolved_outcome: row.resolved_outcome,
            resolved_at: decode_opt_time(row.resolved_at.as_deref())?,
            created_at: decode_time(&row.created_at)?,
            updated_at: decode_time(&row.updated_at)?,
        })
    }
}

/// Database row for a bet. Odds keep their published decimal text.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = bets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BetRow {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub outcome: String,
    pub amount: i64,
    pub locked_odds: String,
    pub potential_payout: i64,
    pub status: String,
    pub payout: Option<i64>,
    pub settled_at: Option<String>,
    pub created_at: String,
}

impl From<&Bet> for BetRow {
    fn from(bet: &Bet) -> Self {
        Self {
            id: bet.id.to_string(),
            user_id: bet.user_id.to_string(),
            event_id: bet.event_id.to_string(),
            outcome: bet.outcome.clone(),
            amount: bet.amount,
            locked_odds: bet.locked_odds.to_string(),
            potential_payout: bet.potential_payout,
            status: bet.status.as_str().to_string(),
            payout: bet.payout,
            settled_at: bet.settled_at.map(encode_time),
            created_at: encode_time(bet.created_at),
        }
    }
}

impl TryFrom<BetRow> for Bet {
    type Error = Error;

    fn try_from(row: BetRow) -> Result<Self> {
        let locked_odds: Decimal = row
            .locked_odds
            .parse()
            .map_err(|e| Error::Parse(format!("locked odds '{}': {e}", row.locked_odds)))?;
        Ok(Self {
            id: BetId::from(row.id),
            user_id: UserId::from(row.user_id),
            event_id: EventId::from(row.event_id),
            outcome: row.outcome,
            amount: row.amount,
            locked_odds,
            potential_payout: row.potential_payout,
            status: decode_enum(&row.status)?,
            payout: row.payout,
            settled_at: decode_opt_time(row.settled_at.as_deref())?,
            created_at: decode_time(&row.created_at)?,
        })
    }
}

/// Database row for a settlement (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = settlements)]
pub struct NewSettlementRow {
    pub event_id: String,
    pub resolved_outcome: String,
    pub total_bets: i64,
    pub total_payouts: i64,
    pub settled_at: String,
}

impl From<&Settlement> for NewSettlementRow {
    fn from(s: &Settlement) -> Self {
        Self {
            event_id: s.event_id.to_string(),
            resolved_outcome: s.resolved_outcome.clone(),
            total_bets: s.total_bets,
            total_payouts: s.total_payouts,
            settled_at: encode_time(s.settled_at),
        }
    }
}

/// Database row for a settlement (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = settlements)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SettlementRow {
    pub id: i64,
    pub event_id: String,
    pub resolved_outcome: String,
    pub total_bets: i64,
    pub total_payouts: i64,
    pub settled_at: String,
}

impl TryFrom<SettlementRow> for Settlement {
    type Error = Error;

    fn try_from(row: SettlementRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            event_id: EventId::from(row.event_id),
            resolved_outcome: row.resolved_outcome,
            total_bets: row.total_bets,
            total_payouts: row.total_payouts,
            settled_at: decode_time(&row.settled_at)?,
        })
    }
}

/// Database row for a ledger entry (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = credit_transactions)]
pub struct NewTransactionRow {
    pub user_id: String,
    pub kind: String,
    pub amount: i64,
    pub balance_after: i64,
    pub reference_id: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<&NewCreditTransaction> for NewTransactionRow {
    fn from(entry: &NewCreditTransaction) -> Self {
        Self {
            user_id: entry.user_id.to_string(),
            kind: entry.kind.as_str().to_string(),
            amount: entry.amount,
            balance_after: entry.balance_after,
            reference_id: entry.reference_id.clone(),
            description: entry.description.clone(),
            created_at: encode_time(entry.created_at),
        }
    }
}

/// Database row for a ledger entry (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = credit_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionRow {
    pub id: i64,
    pub user_id: String,
    pub kind: String,
    pub amount: i64,
    pub balance_after: i64,
    pub reference_id: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

impl TryFrom<TransactionRow> for CreditTransaction {
    type Error = Error;

    fn try_from(row: TransactionRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: UserId::from(row.user_id),
            kind: decode_enum(&row.kind)?,
            amount: row.amount,
            balance_after: row.balance_after,
            reference_id: row.reference_id,
            description: row.description,
            created_at: decode_time(&row.created_at)?,
        })
    }
}

/// Database row for a leaderboard entry (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = rankings)]
pub struct NewRankingRow {
    pub user_id: String,
    pub period: String,
    pub total_assets: i64,
    pub total_profit: i64,
    pub win_count: i64,
    pub loss_count: i64,
    pub win_rate: f64,
    pub roi: f64,
    pub consecutive_wins: i32,
    pub rank_position: i32,
    pub calculated_at: String,
}

impl From<&Ranking> for NewRankingRow {
    fn from(r: &Ranking) -> Self {
        Self {
            user_id: r.user_id.to_string(),
            period: r.period.as_str().to_string(),
            total_assets: r.total_assets,
            total_profit: r.total_profit,
            win_count: r.win_count,
            loss_count: r.loss_count,
            win_rate: r.win_rate,
            roi: r.roi,
            consecutive_wins: r.consecutive_wins,
            rank_position: r.rank_position,
            calculated_at: encode_time(r.calculated_at),
        }
    }
}

/// Database row for a leaderboard entry (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = rankings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RankingRow {
    pub id: i64,
    pub user_id: String,
    pub period: String,
    pub total_assets: i64,
    pub total_profit: i64,
    pub win_count: i64,
    pub loss_count: i64,
    pub win_rate: f64,
    pub roi: f64,
    pub consecutive_wins: i32,
    pub rank_position: i32,
    pub calculated_at: String,
}

impl TryFrom<RankingRow> for Ranking {
    type Error = Error;

    fn try_from(row: RankingRow) -> Result<Self> {
        Ok(Self {
            user_id: UserId::from(row.user_id),
            period: decode_enum(&row.period)?,
            total_assets: row.total_assets,
            total_profit: row.total_profit,
            win_count: row.win_count,
            loss_count: row.loss_count,
            win_rate: row.win_rate,
            roi: row.roi,
            consecutive_wins: row.consecutive_wins,
            rank_position: row.rank_position,
            calculated_at: decode_time(&row.calculated_at)?,
        })
    }
}
