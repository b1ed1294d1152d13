//! CLI integration tests.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A scratch directory holding the database and an optional config file.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn wagerbook(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("wagerbook");
        cmd.env("DATABASE_URL", self.dir.path().join("ledger.db"))
            .env("RUST_LOG", "warn")
            .arg("--config")
            .arg(self.dir.path().join("config.toml"));
        cmd
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .wagerbook()
            .arg("--json")
            .args(args)
            .output()
            .expect("run wagerbook");
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("one JSON document")
    }

    fn publish_rain(&self) {
        self.wagerbook()
            .args([
                "event", "publish", "rain", "--question", "Will it rain?", "--outcome", "Yes",
                "--outcome", "No", "--price", "0.5", "--price", "0.5",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created event rain"));
    }
}

#[test]
fn help_lists_commands() {
    cargo_bin_cmd!("wagerbook")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sweep"))
        .stdout(predicate::str::contains("settle"))
        .stdout(predicate::str::contains("rankings"));
}

#[test]
fn bet_and_settle_flow() {
    let ws = Workspace::new();
    ws.wagerbook()
        .args(["account", "alice", "--name", "Alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice (alice)"));
    ws.publish_rain();

    let bet = ws.json(&["bet", "alice", "rain", "yes", "1000"]);
    assert_eq!(bet["command"], "bet");
    assert_eq!(bet["bet"]["potential_payout"], 2000);
    assert_eq!(bet["bet"]["status"], "pending");

    let settled = ws.json(&["settle", "rain", "Yes"]);
    assert_eq!(settled["settlement"]["total_bets"], 1);
    assert_eq!(settled["settlement"]["total_payouts"], 2000);

    let account = ws.json(&["account", "alice"]);
    assert_eq!(account["user"]["balance"], 11_000);
    assert_eq!(account["user"]["frozen_balance"], 0);

    let rankings = ws.json(&["rankings", "--period", "all-time"]);
    assert_eq!(rankings["rankings"][0]["user_id"], "alice");
    assert_eq!(rankings["rankings"][0]["rank_position"], 1);

    ws.wagerbook()
        .args(["audit", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ledger is consistent"));
}

#[test]
fn resolve_then_sweep() {
    let ws = Workspace::new();
    ws.publish_rain();

    let resolved = ws.json(&["event", "resolve", "rain", "no"]);
    assert_eq!(resolved["changed"], true);

    let report = ws.json(&["sweep"]);
    assert_eq!(report["command"], "sweep");
    assert_eq!(report["candidates"], 1);
    assert_eq!(report["settled"][0]["resolved_outcome"], "No");

    let again = ws.json(&["sweep"]);
    assert_eq!(again["candidates"], 0);

    let stats = ws.json(&["stats"]);
    assert_eq!(stats["stats"]["settled_events"], 1);
    assert_eq!(stats["stats"]["open_events"], 0);
}

#[test]
fn adjust_accepts_negative_delta() {
    let ws = Workspace::new();
    ws.wagerbook().args(["account", "bob"]).assert().success();

    let adjusted = ws.json(&["adjust", "bob", "-250"]);
    assert_eq!(adjusted["delta"], -250);
    assert_eq!(adjusted["user"]["balance"], 9_750);
}

#[test]
fn insufficient_funds_exits_nonzero() {
    let ws = Workspace::new();
    ws.wagerbook().args(["account", "bob"]).assert().success();
    ws.publish_rain();

    ws.wagerbook()
        .args(["bet", "bob", "rain", "Yes", "20000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("insufficient funds"));
}

#[test]
fn unknown_event_exits_nonzero() {
    let ws = Workspace::new();
    ws.wagerbook()
        .args(["settle", "nowhere", "Yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("event not found: nowhere"));
}

#[test]
fn invalid_config_exits_nonzero() {
    let ws = Workspace::new();
    std::fs::write(
        ws.dir.path().join("config.toml"),
        "[settlement]\ninterval_secs = 0\n",
    )
    .expect("write config");

    ws.wagerbook()
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("settlement.interval_secs"));
}
