use thiserror::Error;

use crate::domain::event::EventStatus;
use crate::domain::id::{BetId, EventId, UserId};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Event,
    Bet,
    Settlement,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Event => "event",
            Self::Bet => "bet",
            Self::Settlement => "settlement",
        };
        f.write_str(name)
    }
}

/// Ledger errors surfaced to callers of the wagering core.
///
/// Every variant is raised before or inside an atomic unit, so the unit is
/// rolled back and no state changes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("insufficient funds for {user_id}: balance {balance}, required {required}")]
    InsufficientFunds {
        user_id: UserId,
        balance: i64,
        required: i64,
    },

    #[error("outcome '{outcome}' is not offered by event {event_id}")]
    InvalidOutcome { event_id: EventId, outcome: String },

    #[error("invalid odds '{price}' for outcome '{outcome}'")]
    InvalidOdds { outcome: String, price: String },

    #[error("event {event_id} is {status}, not open for betting")]
    EventNotOpen {
        event_id: EventId,
        status: EventStatus,
    },

    #[error("event {event_id} is already resolved")]
    AlreadyResolved { event_id: EventId },

    #[error("invalid credit amount: {amount}")]
    InvalidAmount { amount: i64 },

    #[error("ledger for {user_id} does not replay to its stored balances")]
    LedgerDrift { user_id: UserId },

    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },
}

impl LedgerError {
    pub fn user_not_found(id: &UserId) -> Self {
        Self::NotFound {
            entity: Entity::User,
            id: id.to_string(),
        }
    }

    pub fn event_not_found(id: &EventId) -> Self {
        Self::NotFound {
            entity: Entity::Event,
            id: id.to_string(),
        }
    }

    pub fn bet_not_found(id: &BetId) -> Self {
        Self::NotFound {
            entity: Entity::Bet,
            id: id.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Store failures (lock timeouts, connectivity, constraint violations)
    /// leave the unit rolled back and may succeed on a later attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Database(_))
    }

    /// The ledger error carried by this error, if any.
    #[must_use]
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(e) => Some(e),
            _ => None,
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for Error {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Error::Connection(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
