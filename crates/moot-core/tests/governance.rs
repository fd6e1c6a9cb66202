//! # Moot Integration Tests
//!
//! End-to-end governance scenarios over an on-disk database.
//!
//! ## Coverage
//!
//! | Behavior | Test |
//! |----------|------|
//! | Ban approved by majority of electorate | `test_ban_scenario` |
//! | Expiry with no ballots | `test_expiry_scenario` |
//! | Deadline beats majority | `test_deadline_priority` |
//! | Double evaluation | `test_second_evaluate_not_found` |
//! | Censor idempotence | `test_censor_twice` |
//! | Stake gating | `test_insufficient_stake_blocks_creation` |
//! | Electorate snapshot | `test_late_joiner_cannot_vote`, `test_leaver_keeps_vote` |
//! | Non-cascading group deletion | `test_delete_group_leaves_other_proposals` |
//! | Concurrent callers | `test_concurrent_*` |

use chrono::Duration;
use moot_core::{
    Action, Consequence, ErrorKind, GroupId, ManualClock, Moot, MootConfig, MootError, Status,
    UserId,
};
use moot_store::Store;
use std::sync::Arc;
use tempfile::TempDir;

/// Creates a test configuration with a temporary database.
fn test_config(temp_dir: &TempDir) -> MootConfig {
    let mut config = MootConfig::default();
    config.store.db_path = temp_dir.path().join("test_moot.db");
    config
}

fn open(config: MootConfig) -> (Moot, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let store = Store::open(&config.store.db_path).unwrap();
    let moot = Moot::with_store(config, store, clock.clone()).unwrap();
    (moot, clock)
}

fn user(name: &str) -> UserId {
    UserId::new(name)
}

/// Registers `names` and puts them in one group owned by the first.
fn group_of(moot: &Moot, names: &[&str]) -> GroupId {
    for name in names {
        moot.register_user(&user(name)).unwrap();
    }
    let group = moot.groups().create_group(&user(names[0])).unwrap();
    for name in &names[1..] {
        moot.groups().invite(&group.id, &user(names[0]), &user(name)).unwrap();
    }
    group.id
}

// =============================================================================
// END-TO-END SCENARIOS
// =============================================================================

#[test]
fn test_ban_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, _clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a", "b", "c", "d"]);

    let proposal = moot
        .propose(&user("a"), &scope, "spamming", Action::Ban { user: user("d") })
        .unwrap();
    assert_eq!(proposal.electorate.len(), 4);
    assert_eq!(moot.ledger().balance(&user("a")).unwrap(), 0);

    moot.cast_yes(&proposal.id, &user("b")).unwrap();
    let tally = moot.cast_yes(&proposal.id, &user("c")).unwrap();
    assert_eq!(tally.yes, 2);
    assert_eq!(moot.evaluate(&proposal.id).unwrap().status, Status::Pending);

    moot.cast_yes(&proposal.id, &user("d")).unwrap();
    let verdict = moot.evaluate(&proposal.id).unwrap();
    assert_eq!(verdict.status, Status::Approved);
    assert!(matches!(verdict.consequence, Some(Consequence::Banned { .. })));

    let residents = moot.groups().residents(&scope).unwrap();
    let expected: Vec<UserId> = ["a", "b", "c"].iter().map(|n| user(n)).collect();
    assert_eq!(residents.into_iter().collect::<Vec<_>>(), expected);
    assert!(moot.council().proposal(&proposal.id).is_err());
}

#[test]
fn test_expiry_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&temp_dir);
    config.governance.voting_window_secs = 1;
    let (moot, clock) = open(config);
    let scope = group_of(&moot, &["a", "b"]);

    let proposal = moot.propose(&user("a"), &scope, "", Action::DeleteGroup).unwrap();
    clock.advance(Duration::seconds(2));

    let verdict = moot.evaluate(&proposal.id).unwrap();
    assert_eq!(verdict.status, Status::Expired);
    assert!(verdict.consequence.is_none());
    assert!(moot.council().proposal(&proposal.id).is_err());
    assert!(moot.groups().group(&scope).is_ok());
    // The stake is not refunded.
    assert_eq!(moot.ledger().balance(&user("a")).unwrap(), 0);
}

#[test]
fn test_deadline_priority() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a", "b"]);

    let proposal = moot.propose(&user("a"), &scope, "", Action::DeleteGroup).unwrap();
    moot.cast_yes(&proposal.id, &user("a")).unwrap();
    moot.cast_yes(&proposal.id, &user("b")).unwrap();
    clock.advance(Duration::days(1) + Duration::seconds(1));

    assert_eq!(moot.evaluate(&proposal.id).unwrap().status, Status::Expired);
    assert!(moot.groups().group(&scope).is_ok());
}

#[test]
fn test_second_evaluate_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, _clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a"]);

    let proposal = moot.propose(&user("a"), &scope, "", Action::DeleteGroup).unwrap();
    moot.cast_yes(&proposal.id, &user("a")).unwrap();

    assert!(moot.evaluate(&proposal.id).unwrap().is_approved());
    let err = moot.evaluate(&proposal.id).unwrap_err();
    assert!(err.is_already_resolved());
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_censor_twice() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, _clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a"]);
    moot.ledger().credit(&user("a"), 100).unwrap();

    for _ in 0..2 {
        let proposal = moot
            .propose(&user("a"), &scope, "", Action::Censor { word: "heck".into() })
            .unwrap();
        moot.cast_yes(&proposal.id, &user("a")).unwrap();
        assert!(moot.evaluate(&proposal.id).unwrap().is_approved());
    }

    let list = moot.groups().group(&scope).unwrap().word_list;
    assert_eq!(moot.groups().word_lists().words(&list).unwrap(), vec!["heck".to_string()]);
    assert_eq!(
        moot.groups().word_lists().mask(&list, "what the Heck").unwrap(),
        "what the ****"
    );
}

#[test]
fn test_uncensor_after_censor() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, _clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a"]);
    moot.ledger().credit(&user("a"), 100).unwrap();

    for action in [
        Action::Censor { word: "heck".into() },
        Action::Uncensor { word: "heck".into() },
    ] {
        let proposal = moot.propose(&user("a"), &scope, "", action).unwrap();
        moot.cast_yes(&proposal.id, &user("a")).unwrap();
        let verdict = moot.evaluate(&proposal.id).unwrap();
        assert!(!verdict.consequence_failed());
    }

    let list = moot.groups().group(&scope).unwrap().word_list;
    assert!(!moot.groups().word_lists().contains(&list, "heck").unwrap());
}

// =============================================================================
// STAKE AND ELECTORATE
// =============================================================================

#[test]
fn test_insufficient_stake_blocks_creation() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, _clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a", "b"]);
    moot.ledger().debit(&user("a"), 1).unwrap();

    let err = moot.propose(&user("a"), &scope, "", Action::DeleteGroup).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotAllowed);
    assert_eq!(moot.ledger().balance(&user("a")).unwrap(), 99);
    assert!(moot.council().list_open(None).unwrap().is_empty());
    assert!(moot.groups().group(&scope).unwrap().proposals.is_empty());
}

#[test]
fn test_late_joiner_cannot_vote() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, _clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a", "b"]);

    let proposal = moot.propose(&user("a"), &scope, "", Action::DeleteGroup).unwrap();
    moot.register_user(&user("late")).unwrap();
    moot.groups().invite(&scope, &user("a"), &user("late")).unwrap();

    let err = moot.cast_yes(&proposal.id, &user("late")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAllowed);
}

#[test]
fn test_leaver_keeps_vote() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, _clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a", "b"]);

    let proposal = moot.propose(&user("a"), &scope, "", Action::DeleteGroup).unwrap();
    moot.groups().remove_resident(&scope, &user("b")).unwrap();

    moot.cast_yes(&proposal.id, &user("a")).unwrap();
    moot.cast_yes(&proposal.id, &user("b")).unwrap();
    assert!(moot.evaluate(&proposal.id).unwrap().is_approved());
}

#[test]
fn test_double_vote_either_side() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, _clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a", "b"]);

    let proposal = moot.propose(&user("a"), &scope, "", Action::DeleteGroup).unwrap();
    moot.cast_no(&proposal.id, &user("b")).unwrap();

    let err = moot.cast_yes(&proposal.id, &user("b")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_delete_group_leaves_other_proposals() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, _clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a", "b"]);

    let delete = moot.propose(&user("a"), &scope, "", Action::DeleteGroup).unwrap();
    let censor = moot
        .propose(&user("b"), &scope, "", Action::Censor { word: "heck".into() })
        .unwrap();
    for voter in ["a", "b"] {
        moot.cast_yes(&delete.id, &user(voter)).unwrap();
        moot.cast_yes(&censor.id, &user(voter)).unwrap();
    }

    assert!(moot.evaluate(&delete.id).unwrap().is_approved());
    assert!(moot.groups().group(&scope).is_err());

    let verdict = moot.evaluate(&censor.id).unwrap();
    assert!(verdict.is_approved());
    assert!(verdict.consequence_failed());
    assert!(moot.council().list_open(None).unwrap().is_empty());
}

// =============================================================================
// SWEEPS
// =============================================================================

#[test]
fn test_sweep_report() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a", "b", "c"]);
    moot.ledger().credit(&user("a"), 200).unwrap();

    let approved = moot
        .propose(&user("a"), &scope, "", Action::Censor { word: "heck".into() })
        .unwrap();
    let pending = moot
        .propose(&user("a"), &scope, "", Action::Censor { word: "darn".into() })
        .unwrap();
    for voter in ["a", "b"] {
        moot.cast_yes(&approved.id, &user(voter)).unwrap();
    }

    let report = moot.sweep(Some(&scope)).unwrap();
    assert_eq!(report.approved, vec![approved.id]);
    assert_eq!(report.pending, vec![pending.id]);
    assert!(report.failures.is_empty());

    clock.advance(Duration::days(2));
    let open = moot.list_open(Some(&scope)).unwrap();
    assert!(open.is_empty());
}

#[test]
fn test_reopen_database() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let id = {
        let (moot, _clock) = open(config.clone());
        let scope = group_of(&moot, &["a", "b"]);
        let proposal = moot.propose(&user("a"), &scope, "", Action::DeleteGroup).unwrap();
        moot.cast_yes(&proposal.id, &user("b")).unwrap();
        moot.store().flush().unwrap();
        proposal.id
    };

    let (moot, _clock) = open(config);
    let proposal = moot.proposal(&id).unwrap().unwrap();
    assert!(proposal.yes.contains(&user("b")));
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[test]
fn test_concurrent_proposals_never_overdraw() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&temp_dir);
    config.governance.stake = 30;
    let (moot, _clock) = open(config);
    let scope = group_of(&moot, &["a"]);

    let results: Vec<Result<_, MootError>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..10)
            .map(|_| s.spawn(|| moot.propose(&user("a"), &scope, "", Action::DeleteGroup)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let opened = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(opened, 3);
    assert_eq!(moot.ledger().balance(&user("a")).unwrap(), 10);
    assert_eq!(moot.council().list_open(None).unwrap().len(), 3);
    assert_eq!(moot.groups().group(&scope).unwrap().proposals.len(), 3);
}

#[test]
fn test_concurrent_evaluate_resolves_once() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, _clock) = open(test_config(&temp_dir));
    let scope = group_of(&moot, &["a"]);
    let proposal = moot
        .propose(&user("a"), &scope, "", Action::Censor { word: "heck".into() })
        .unwrap();
    moot.cast_yes(&proposal.id, &user("a")).unwrap();

    let results: Vec<Result<_, MootError>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| moot.evaluate(&proposal.id))).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let resolved = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(resolved, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(MootError::is_already_resolved));
}

#[test]
fn test_concurrent_casts_and_evaluations() {
    let temp_dir = TempDir::new().unwrap();
    let (moot, _clock) = open(test_config(&temp_dir));
    let names: Vec<String> = (0..10).map(|i| format!("u{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let scope = group_of(&moot, &refs);
    let proposal = moot.propose(&user("u0"), &scope, "", Action::DeleteGroup).unwrap();

    std::thread::scope(|s| {
        for name in &refs {
            let moot = &moot;
            let id = proposal.id;
            s.spawn(move || {
                let _ = moot.cast_yes(&id, &user(name));
                let _ = moot.evaluate(&id);
            });
        }
    });

    // Once 6 of 10 voted yes the proposal resolved, and no ballot landed
    // on a deleted record.
    assert!(moot.council().proposal(&proposal.id).is_err());
    assert!(moot.groups().group(&scope).is_err());
}
