//! Handler for the `rankings` command.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::RankingsArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::Ranking;
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;
use crate::port::outbound::ledger::LedgerStore;

#[derive(Tabled)]
struct RankingRow {
    #[tabled(rename = "#")]
    position: i32,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Assets")]
    assets: i64,
    #[tabled(rename = "Profit")]
    profit: i64,
    #[tabled(rename = "W/L")]
    record: String,
    #[tabled(rename = "Win rate")]
    win_rate: String,
    #[tabled(rename = "ROI")]
    roi: String,
    #[tabled(rename = "Streak")]
    streak: i32,
}

impl From<&Ranking> for RankingRow {
    fn from(ranking: &Ranking) -> Self {
        Self {
            position: ranking.rank_position,
            user: ranking.user_id.to_string(),
            assets: ranking.total_assets,
            profit: ranking.total_profit,
            record: format!("{}/{}", ranking.win_count, ranking.loss_count),
            win_rate: output::percent(ranking.win_rate),
            roi: output::percent(ranking.roi),
            streak: ranking.consecutive_wins,
        }
    }
}

/// Execute `rankings [--period] [--recalculate]`.
pub fn execute<S: LedgerStore>(services: &Services<S>, args: &RankingsArgs) -> Result<()> {
    let summary = if args.recalculate {
        Some(services.rankings.recalculate()?)
    } else {
        None
    };
    let rankings = services.rankings.rankings(args.period)?;

    if output::is_json() {
        return output::json_output(
            "rankings",
            json!({
                "period": args.period,
                "recalculated": summary,
                "rankings": rankings,
            }),
        );
    }

    if let Some(summary) = summary {
        output::success(&format!(
            "Rankings recalculated ({} all-time, {} weekly, {} monthly)",
            summary.all_time, summary.weekly, summary.monthly
        ));
    }
    output::section(&format!("Rankings: {}", args.period));
    if rankings.is_empty() {
        output::note("No ranked users yet");
        return Ok(());
    }

    let rows: Vec<RankingRow> = rankings.iter().map(RankingRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
