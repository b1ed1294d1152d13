//! Settlement through force-settle and the scheduled sweep.

use wagerbook::domain::{BetStatus, EventStatus, TransactionKind};
use wagerbook::error::{Entity, Error, LedgerError};
use wagerbook::infrastructure::bootstrap::Services;
use wagerbook::port::outbound::ledger::{LedgerStore, LedgerView};
use wagerbook::testkit::domain::{binary_listing, event, user};
use wagerbook::testkit::ledger::{seed_event, seed_user_with, TempLedger};

fn ledger_error(err: Error) -> LedgerError {
    match err {
        Error::Ledger(e) => e,
        other => panic!("expected ledger error, got {other:?}"),
    }
}

/// Alice stakes 1000 on "Yes" and Bob 500 on "No", both at 0.5.
fn worked_example<S: LedgerStore>(services: &Services<S>) {
    seed_user_with(services, "alice", 5_000);
    seed_user_with(services, "bob", 5_000);
    seed_event(services, binary_listing("rain", "0.5", "0.5"));
    services
        .bets
        .place_bet(&user("alice"), &event("rain"), "Yes", 1_000)
        .unwrap();
    services
        .bets
        .place_bet(&user("bob"), &event("rain"), "No", 500)
        .unwrap();
}

fn assert_worked_example_settled<S: LedgerStore>(services: &Services<S>) {
    let alice = services.accounts.user(&user("alice")).unwrap();
    assert_eq!(alice.balance, 4_000 + 2_000);
    assert_eq!(alice.frozen_balance, 0);
    assert_eq!(alice.total_wins, 1);
    assert_eq!(alice.current_streak, 1);
    assert_eq!(alice.max_streak, 1);

    let bob = services.accounts.user(&user("bob")).unwrap();
    assert_eq!(bob.balance, 4_500);
    assert_eq!(bob.frozen_balance, 0);
    assert_eq!(bob.total_wins, 0);
    assert_eq!(bob.current_streak, 0);

    let settlement = services
        .settlement
        .settlement(&event("rain"))
        .unwrap()
        .expect("settlement row");
    assert_eq!(settlement.resolved_outcome, "Yes");
    assert_eq!(settlement.total_bets, 2);
    assert_eq!(settlement.total_payouts, 2_000);

    let won = services
        .bets
        .bets_for_user(&user("alice"), Some(BetStatus::Won))
        .unwrap();
    assert_eq!(won.len(), 1);
    assert_eq!(won[0].payout, Some(2_000));
    assert!(won[0].settled_at.is_some());

    let lost = services
        .bets
        .bets_for_user(&user("bob"), Some(BetStatus::Lost))
        .unwrap();
    assert_eq!(lost.len(), 1);
    assert_eq!(lost[0].payout, Some(0));

    for id in ["alice", "bob"] {
        let audit = services.accounts.audit(&user(id)).unwrap();
        assert!(audit.is_consistent(), "{id}: {audit:?}");
    }
}

#[test]
fn force_settle_pays_worked_example() {
    let db = TempLedger::create("settle-force");
    let services = db.services();
    worked_example(&services);

    let settlement = services.settlement.force_settle(&event("rain"), "yes").unwrap();
    assert!(settlement.id > 0);

    let rain = services.feed.event(&event("rain")).unwrap();
    assert_eq!(rain.status, EventStatus::Resolved);
    assert_eq!(rain.resolved_outcome.as_deref(), Some("Yes"));
    assert!(rain.resolved_at.is_some());

    assert_worked_example_settled(&services);

    let alice_entries = services.accounts.transactions(&user("alice")).unwrap();
    let won = alice_entries.last().unwrap();
    assert_eq!(won.kind, TransactionKind::BetWon);
    assert_eq!(won.amount, 2_000);
    assert_eq!(won.balance_after, 6_000);

    let bob_entries = services.accounts.transactions(&user("bob")).unwrap();
    let lost = bob_entries.last().unwrap();
    assert_eq!(lost.kind, TransactionKind::BetLost);
    assert_eq!(lost.amount, 0);
    assert_eq!(lost.balance_after, 4_500);
}

#[test]
fn sweep_settles_resolved_events_and_refreshes_rankings() {
    let db = TempLedger::create("settle-sweep");
    let services = db.services();
    worked_example(&services);
    assert!(services
        .feed
        .publish_resolution(&event("rain"), "YES")
        .unwrap());

    let report = services.settlement.run_sweep().unwrap();
    assert!(!report.skipped);
    assert_eq!(report.candidates, 1);
    assert_eq!(report.settled_count(), 1);
    assert!(report.failed.is_empty());
    assert!(report.rankings_refreshed);

    assert_worked_example_settled(&services);
    assert_eq!(
        services
            .rankings
            .rankings(wagerbook::domain::RankingPeriod::AllTime)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn second_sweep_is_a_no_op() {
    let db = TempLedger::create("settle-twice");
    let services = db.services();
    worked_example(&services);
    services.feed.publish_resolution(&event("rain"), "Yes").unwrap();

    services.settlement.run_sweep().unwrap();
    let report = services.settlement.run_sweep().unwrap();

    assert_eq!(report.candidates, 0);
    assert!(report.settled.is_empty());
    assert!(!report.rankings_refreshed);
    assert_worked_example_settled(&services);
}

#[test]
fn sweep_after_force_settle_is_a_no_op() {
    let db = TempLedger::create("settle-force-sweep");
    let services = db.services();
    worked_example(&services);

    services.settlement.force_settle(&event("rain"), "Yes").unwrap();
    let report = services.settlement.run_sweep().unwrap();

    assert_eq!(report.candidates, 0);
    assert_worked_example_settled(&services);
    assert_eq!(services.settlement.recent_settlements(10).unwrap().len(), 1);
}

#[test]
fn force_settle_twice_is_already_resolved() {
    let db = TempLedger::create("settle-force-twice");
    let services = db.services();
    worked_example(&services);
    services.settlement.force_settle(&event("rain"), "Yes").unwrap();

    let err = services
        .settlement
        .force_settle(&event("rain"), "No")
        .unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::AlreadyResolved { .. }));
    assert_worked_example_settled(&services);
}

#[test]
fn force_settle_of_resolved_unsettled_event_is_already_resolved() {
    let db = TempLedger::create("settle-force-resolved");
    let services = db.services();
    worked_example(&services);
    services.feed.publish_resolution(&event("rain"), "Yes").unwrap();

    let err = services
        .settlement
        .force_settle(&event("rain"), "Yes")
        .unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::AlreadyResolved { .. }));

    // The sweep still owns it.
    let report = services.settlement.run_sweep().unwrap();
    assert_eq!(report.settled_count(), 1);
}

#[test]
fn force_settle_validates_event_and_outcome() {
    let db = TempLedger::create("settle-validate");
    let services = db.services();
    worked_example(&services);

    let err = services
        .settlement
        .force_settle(&event("nowhere"), "Yes")
        .unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::NotFound {
            entity: Entity::Event,
            ..
        }
    ));

    let err = services
        .settlement
        .force_settle(&event("rain"), "Maybe")
        .unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::InvalidOutcome { .. }));

    let rain = services.feed.event(&event("rain")).unwrap();
    assert_eq!(rain.status, EventStatus::Open);
    assert!(services.settlement.settlement(&event("rain")).unwrap().is_none());
    assert_eq!(
        services
            .bets
            .bets_for_user(&user("alice"), Some(BetStatus::Pending))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn event_without_bets_settles_with_zero_totals() {
    let db = TempLedger::create("settle-empty");
    let services = db.services();
    seed_event(&services, binary_listing("quiet", "0.5", "0.5"));

    let settlement = services.settlement.force_settle(&event("quiet"), "No").unwrap();
    assert_eq!(settlement.total_bets, 0);
    assert_eq!(settlement.total_payouts, 0);
}

#[test]
fn failed_event_does_not_block_the_rest_of_the_sweep() {
    let db = TempLedger::create("settle-isolation");
    let (faulty, services) = db.faulty_services();
    seed_user_with(&services, "alice", 1_000);
    seed_event(&services, binary_listing("first", "0.5", "0.5"));
    seed_event(&services, binary_listing("second", "0.5", "0.5"));
    services
        .bets
        .place_bet(&user("alice"), &event("first"), "Yes", 100)
        .unwrap();
    services
        .bets
        .place_bet(&user("alice"), &event("second"), "Yes", 100)
        .unwrap();
    services.feed.publish_resolution(&event("first"), "Yes").unwrap();
    services.feed.publish_resolution(&event("second"), "Yes").unwrap();

    faulty.fail_settlement_of(event("first"));
    let report = services.settlement.run_sweep().unwrap();

    assert_eq!(report.candidates, 2);
    assert_eq!(report.settled_count(), 1);
    assert_eq!(report.settled[0].event_id, event("second"));
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].event_id, event("first"));
    assert!(report.rankings_refreshed);

    // The failed event rolled back completely.
    let alice = faulty.inner().user(&user("alice")).unwrap().unwrap();
    assert_eq!(alice.frozen_balance, 100);
    assert_eq!(alice.balance, 800 + 200);
    assert!(faulty
        .inner()
        .settlement_for_event(&event("first"))
        .unwrap()
        .is_none());

    faulty.clear();
    let retry = services.settlement.run_sweep().unwrap();
    assert_eq!(retry.candidates, 1);
    assert_eq!(retry.settled_count(), 1);

    let alice = services.accounts.user(&user("alice")).unwrap();
    assert_eq!(alice.frozen_balance, 0);
    assert_eq!(alice.balance, 800 + 400);
    assert!(services.accounts.audit(&user("alice")).unwrap().is_consistent());
}

#[test]
fn overflowing_payout_fails_only_its_own_event() {
    let db = TempLedger::create("settle-overflow");
    let services = db.services();
    seed_user_with(&services, "alice", i64::MAX - 10_000);
    seed_user_with(&services, "bob", 1_000);
    seed_event(&services, binary_listing("rain", "0.01", "0.99"));
    seed_event(&services, binary_listing("snow", "0.5", "0.5"));
    services
        .bets
        .place_bet(&user("alice"), &event("rain"), "Yes", 5_000)
        .unwrap();
    services
        .bets
        .place_bet(&user("bob"), &event("snow"), "Yes", 100)
        .unwrap();
    services.feed.publish_resolution(&event("rain"), "Yes").unwrap();
    services.feed.publish_resolution(&event("snow"), "Yes").unwrap();

    let report = services.settlement.run_sweep().unwrap();

    assert_eq!(report.candidates, 2);
    assert_eq!(report.settled_count(), 1);
    assert_eq!(report.settled[0].event_id, event("snow"));
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].event_id, event("rain"));

    let alice = services.accounts.user(&user("alice")).unwrap();
    assert_eq!(alice.balance, i64::MAX - 15_000);
    assert_eq!(alice.frozen_balance, 5_000);
    assert!(services.settlement.settlement(&event("rain")).unwrap().is_none());

    let bob = services.accounts.user(&user("bob")).unwrap();
    assert_eq!(bob.balance, 900 + 200);
    assert_eq!(bob.frozen_balance, 0);
}

#[test]
fn ranking_failure_does_not_undo_force_settle() {
    let db = TempLedger::create("settle-ranking-failure");
    let (faulty, services) = db.faulty_services();
    worked_example(&services);

    faulty.fail_at(wagerbook::testkit::faulty::FaultPoint::ReplaceRankings);
    let settlement = services.settlement.force_settle(&event("rain"), "Yes").unwrap();
    assert_eq!(settlement.total_payouts, 2_000);

    faulty.clear();
    assert_worked_example_settled(&services);
}
