//! Leaderboard snapshots.
//!
//! Rankings are a pure function of user and bet state at a fixed `now`, so
//! rebuilding them twice yields identical rows.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bet::{Bet, BetStatus};
use super::id::UserId;
use super::money::Credits;
use super::user::User;

/// Leaderboard period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPeriod {
    AllTime,
    Weekly,
    Monthly,
}

impl RankingPeriod {
    pub const ALL: [Self; 3] = [Self::AllTime, Self::Weekly, Self::Monthly];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AllTime => "all_time",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RankingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_time" | "all-time" | "alltime" => Ok(Self::AllTime),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("unknown ranking period: {other}")),
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub user_id: UserId,
    pub period: RankingPeriod,
    pub total_assets: Credits,
    pub total_profit: Credits,
    pub win_count: i64,
    pub loss_count: i64,
    pub win_rate: f64,
    pub roi: f64,
    pub consecutive_wins: i32,
    pub rank_position: i32,
    pub calculated_at: DateTime<Utc>,
}

fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Sort by `key` descending, break ties by user id, assign 1..n.
fn assign_positions<K: Ord>(rows: &mut [Ranking], key: impl Fn(&Ranking) -> K) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| a.user_id.cmp(&b.user_id)));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank_position = (i + 1) as i32;
    }
}

/// All-time leaderboard over every user who has placed a bet.
///
/// `lost_counts` holds each user's number of lost bets.
#[must_use]
pub fn rank_all_time(
    users: &[User],
    lost_counts: &HashMap<UserId, i64>,
    starting_credits: Credits,
    now: DateTime<Utc>,
) -> Vec<Ranking> {
    let mut rows: Vec<Ranking> = users
        .iter()
        .filter(|u| u.total_bets > 0)
        .map(|u| {
            let total_assets = u.total_assets();
            let total_profit = total_assets - starting_credits;
            Ranking {
                user_id: u.id.clone(),
                period: RankingPeriod::AllTime,
                total_assets,
                total_profit,
                win_count: i64::from(u.total_wins),
                loss_count: lost_counts.get(&u.id).copied().unwrap_or(0),
                win_rate: ratio(i64::from(u.total_wins), i64::from(u.total_bets)),
                roi: ratio(total_profit, starting_credits),
                consecutive_wins: u.current_streak,
                rank_position: 0,
                calculated_at: now,
            }
        })
        .collect();
    assign_positions(&mut rows, |r| r.total_assets);
    rows
}

#[derive(Default)]
struct WindowTally {
    payouts: Credits,
    profit: Credits,
    wins: i64,
    losses: i64,
}

/// Windowed leaderboard over bets settled inside the window.
///
/// Bets that are not won or lost are ignored.
#[must_use]
pub fn rank_window(
    period: RankingPeriod,
    settled: &[Bet],
    starting_credits: Credits,
    now: DateTime<Utc>,
) -> Vec<Ranking> {
    let mut by_user: BTreeMap<&UserId, WindowTally> = BTreeMap::new();
    for bet in settled {
        let Some(profit) = bet.profit() else {
            continue;
        };
        let tally = by_user.entry(&bet.user_id).or_default();
        tally.profit += profit;
        if bet.status == BetStatus::Won {
            tally.payouts += bet.payout.unwrap_or(0);
            tally.wins += 1;
        } else {
            tally.losses += 1;
        }
    }

    let mut rows: Vec<Ranking> = by_user
        .into_iter()
        .map(|(user_id, t)| Ranking {
            user_id: user_id.clone(),
            period,
            total_assets: t.payouts,
            total_profit: t.profit,
            win_count: t.wins,
            loss_count: t.losses,
            win_rate: ratio(t.wins, t.wins + t.losses),
            roi: ratio(t.profit, starting_credits),
            consecutive_wins: 0,
            rank_position: 0,
            calculated_at: now,
        })
        .collect();
    assign_positions(&mut rows, |r| r.total_profit);
    rows
}
