//! Monetary types for credit amounts and outcome prices.
//!
//! Credits are whole units; prices are decimals published by the market
//! feed. Payout division truncates toward zero so the ledger never mints
//! fractional credits in the user's favour.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Whole play-money credits. Signed so ledger entries can carry debits.
pub type Credits = i64;

/// Outcome price captured at placement, in (0, 1] for well-formed markets.
pub type Odds = Decimal;

/// Parse a published outcome price.
///
/// Returns `None` unless the text is a strictly positive decimal.
#[must_use]
pub fn parse_odds(price: &str) -> Option<Odds> {
    let trimmed = price.trim();
    let odds = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()?;
    (odds > Decimal::ZERO).then_some(odds)
}

/// `floor(amount / odds)`.
///
/// Returns `None` when the quotient does not fit in [`Credits`].
#[must_use]
pub fn potential_payout(amount: Credits, odds: Odds) -> Option<Credits> {
    Decimal::from(amount).checked_div(odds)?.floor().to_i64()
}
