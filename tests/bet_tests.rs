//! Bet placement against a real SQLite ledger.

use std::sync::Arc;
use std::thread;

use rust_decimal_macros::dec;

use wagerbook::domain::{BetStatus, EventStatus, TransactionKind};
use wagerbook::error::{Entity, Error, LedgerError};
use wagerbook::port::outbound::ledger::LedgerView;
use wagerbook::testkit::domain::{binary_listing, event, listing, user};
use wagerbook::testkit::faulty::FaultPoint;
use wagerbook::testkit::ledger::{seed_event, seed_user, seed_user_with, TempLedger};

fn ledger_error(err: Error) -> LedgerError {
    match err {
        Error::Ledger(e) => e,
        other => panic!("expected ledger error, got {other:?}"),
    }
}

#[test]
fn place_bet_escrows_stake_and_locks_odds() {
    let db = TempLedger::create("bet-escrow");
    let services = db.services();
    seed_user_with(&services, "alice", 1_000);
    seed_event(&services, binary_listing("rain", "0.4", "0.6"));

    let bet = services
        .bets
        .place_bet(&user("alice"), &event("rain"), "Yes", 100)
        .unwrap();

    assert_eq!(bet.status, BetStatus::Pending);
    assert_eq!(bet.locked_odds, dec!(0.4));
    assert_eq!(bet.potential_payout, 250);

    let alice = services.accounts.user(&user("alice")).unwrap();
    assert_eq!(alice.balance, 900);
    assert_eq!(alice.frozen_balance, 100);
    assert_eq!(alice.total_bets, 1);

    let entries = services.accounts.transactions(&user("alice")).unwrap();
    let last = entries.last().unwrap();
    assert_eq!(last.kind, TransactionKind::BetPlaced);
    assert_eq!(last.amount, -100);
    assert_eq!(last.balance_after, 900);
    assert_eq!(last.reference_id.as_deref(), Some(bet.id.as_str()));
}

#[test]
fn payout_truncates() {
    let db = TempLedger::create("bet-truncate");
    let services = db.services();
    seed_user(&services, "alice");
    seed_event(&services, binary_listing("coin", "0.3", "0.7"));

    let bet = services
        .bets
        .place_bet(&user("alice"), &event("coin"), "Yes", 100)
        .unwrap();

    // 100 / 0.3 = 333.33...
    assert_eq!(bet.potential_payout, 333);
}

#[test]
fn outcome_matches_case_insensitively_and_is_stored_as_given() {
    let db = TempLedger::create("bet-case");
    let services = db.services();
    seed_user(&services, "alice");
    seed_event(&services, binary_listing("rain", "0.5", "0.5"));

    let bet = services
        .bets
        .place_bet(&user("alice"), &event("rain"), "yes", 10)
        .unwrap();

    assert_eq!(bet.outcome, "yes");
    assert_eq!(bet.locked_odds, dec!(0.5));
}

#[test]
fn insufficient_funds_leaves_everything_unchanged() {
    let db = TempLedger::create("bet-funds");
    let services = db.services();
    seed_user_with(&services, "bob", 100);
    seed_event(&services, binary_listing("rain", "0.5", "0.5"));
    let entries_before = services.accounts.transactions(&user("bob")).unwrap().len();

    let err = services
        .bets
        .place_bet(&user("bob"), &event("rain"), "Yes", 500)
        .unwrap_err();

    assert!(matches!(
        ledger_error(err),
        LedgerError::InsufficientFunds {
            balance: 100,
            required: 500,
            ..
        }
    ));
    let bob = services.accounts.user(&user("bob")).unwrap();
    assert_eq!(bob.balance, 100);
    assert_eq!(bob.frozen_balance, 0);
    assert_eq!(bob.total_bets, 0);
    assert!(services.bets.bets_for_user(&user("bob"), None).unwrap().is_empty());
    assert_eq!(
        services.accounts.transactions(&user("bob")).unwrap().len(),
        entries_before
    );
}

#[test]
fn rejects_non_positive_amounts() {
    let db = TempLedger::create("bet-amount");
    let services = db.services();
    seed_user(&services, "alice");
    seed_event(&services, binary_listing("rain", "0.5", "0.5"));

    for amount in [0, -5] {
        let err = services
            .bets
            .place_bet(&user("alice"), &event("rain"), "Yes", amount)
            .unwrap_err();
        assert_eq!(ledger_error(err), LedgerError::InvalidAmount { amount });
    }
}

#[test]
fn unknown_outcome_is_rejected() {
    let db = TempLedger::create("bet-outcome");
    let services = db.services();
    seed_user(&services, "alice");
    seed_event(&services, binary_listing("rain", "0.5", "0.5"));

    let err = services
        .bets
        .place_bet(&user("alice"), &event("rain"), "Maybe", 10)
        .unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::InvalidOutcome { .. }));
}

#[test]
fn outcome_without_price_is_invalid() {
    let db = TempLedger::create("bet-noprice");
    let services = db.services();
    seed_user(&services, "alice");
    seed_event(&services, listing("tri", &[("A", "0.5"), ("B", "0.5")]));
    let mut partial = listing("tri", &[("A", "0.5"), ("B", "0.5")]);
    partial.outcomes.push("C".to_string());
    services.feed.publish_event(partial).unwrap();

    let err = services
        .bets
        .place_bet(&user("alice"), &event("tri"), "c", 10)
        .unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::InvalidOutcome { .. }));
}

#[test]
fn unparsable_price_is_invalid_odds() {
    let db = TempLedger::create("bet-odds");
    let services = db.services();
    seed_user(&services, "alice");
    seed_event(&services, listing("odd", &[("Yes", "abc"), ("No", "0")]));

    for outcome in ["Yes", "No"] {
        let err = services
            .bets
            .place_bet(&user("alice"), &event("odd"), outcome, 10)
            .unwrap_err();
        assert!(matches!(ledger_error(err), LedgerError::InvalidOdds { .. }));
    }
    assert_eq!(services.accounts.user(&user("alice")).unwrap().frozen_balance, 0);
}

#[test]
fn resolved_event_is_not_open() {
    let db = TempLedger::create("bet-closed");
    let services = db.services();
    seed_user(&services, "alice");
    seed_event(&services, binary_listing("rain", "0.5", "0.5"));
    services.feed.publish_resolution(&event("rain"), "No").unwrap();

    let err = services
        .bets
        .place_bet(&user("alice"), &event("rain"), "Yes", 10)
        .unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::EventNotOpen {
            status: EventStatus::Resolved,
            ..
        }
    ));
}

#[test]
fn unknown_user_and_event_are_not_found() {
    let db = TempLedger::create("bet-missing");
    let services = db.services();
    seed_user(&services, "alice");
    seed_event(&services, binary_listing("rain", "0.5", "0.5"));

    let err = services
        .bets
        .place_bet(&user("ghost"), &event("rain"), "Yes", 10)
        .unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::NotFound {
            entity: Entity::User,
            ..
        }
    ));

    let err = services
        .bets
        .place_bet(&user("alice"), &event("nowhere"), "Yes", 10)
        .unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::NotFound {
            entity: Entity::Event,
            ..
        }
    ));
}

#[test]
fn failure_after_debit_rolls_back_the_whole_unit() {
    let db = TempLedger::create("bet-atomic");
    let (faulty, services) = db.faulty_services();
    seed_user_with(&services, "alice", 1_000);
    seed_event(&services, binary_listing("rain", "0.5", "0.5"));
    let entries_before = services.accounts.transactions(&user("alice")).unwrap().len();

    for point in [FaultPoint::InsertBet, FaultPoint::AppendTransaction] {
        faulty.fail_at(point);
        let err = services
            .bets
            .place_bet(&user("alice"), &event("rain"), "Yes", 300)
            .unwrap_err();
        assert!(err.is_retryable(), "{point:?}: {err}");

        let alice = faulty.inner().user(&user("alice")).unwrap().unwrap();
        assert_eq!(alice.balance, 1_000, "{point:?}");
        assert_eq!(alice.frozen_balance, 0, "{point:?}");
        assert_eq!(alice.total_bets, 0, "{point:?}");
        assert!(faulty
            .inner()
            .bets_for_user(&user("alice"), None)
            .unwrap()
            .is_empty());
        assert_eq!(
            services.accounts.transactions(&user("alice")).unwrap().len(),
            entries_before
        );
    }

    faulty.clear();
    services
        .bets
        .place_bet(&user("alice"), &event("rain"), "Yes", 300)
        .unwrap();
    assert_eq!(services.accounts.user(&user("alice")).unwrap().balance, 700);
}

#[test]
fn concurrent_bets_never_overdraw() {
    let db = TempLedger::create("bet-concurrent");
    let services = Arc::new(db.services());
    seed_user_with(&services, "alice", 1_000);
    seed_event(&services, binary_listing("rain", "0.5", "0.5"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let services = Arc::clone(&services);
            thread::spawn(move || {
                services
                    .bets
                    .place_bet(&user("alice"), &event("rain"), "Yes", 200)
                    .is_ok()
            })
        })
        .collect();
    let placed = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(placed, 5);
    let alice = services.accounts.user(&user("alice")).unwrap();
    assert_eq!(alice.balance, 0);
    assert_eq!(alice.frozen_balance, 1_000);
    assert_eq!(services.store.pending_stake(&user("alice")).unwrap(), 1_000);
    assert!(services.accounts.audit(&user("alice")).unwrap().is_consistent());
}
