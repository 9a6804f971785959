//! Tests for the transition store and FSM.

use std::sync::Arc;

use proptest::prelude::*;

use super::*;
use crate::audit::MemoryAuditSink;
use crate::clock::ManualClock;
use crate::escrow::EscrowService;
use crate::ledger::{AssetLedger, AssetRecord, AssetStatus, InMemoryAssetLedger};

const ACTOR: &str = "tests";
const PID: &str = "pid_traveler_001";

struct Fixture {
    ledger: Arc<InMemoryAssetLedger>,
    escrow: Arc<EscrowService>,
    store: Arc<InMemoryTransitionStore>,
    audit: Arc<MemoryAuditSink>,
    clock: Arc<ManualClock>,
    fsm: ShardTransitionFsm,
}

fn fixture() -> Fixture {
    let clock = Arc::new(ManualClock::new(1_000));
    let ledger = Arc::new(InMemoryAssetLedger::new(clock.clone()));
    let escrow = Arc::new(EscrowService::new(ledger.clone(), clock.clone()));
    let store = Arc::new(InMemoryTransitionStore::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let fsm = ShardTransitionFsm::new(
        store.clone(),
        escrow.clone(),
        audit.clone(),
        clock.clone(),
    );
    Fixture {
        ledger,
        escrow,
        store,
        audit,
        clock,
        fsm,
    }
}

fn seed_assets(fix: &Fixture, asset_ids: &[&str]) -> Vec<String> {
    for asset_id in asset_ids {
        fix.ledger
            .seed(AssetRecord::seeded(asset_id, PID, 1_000))
            .unwrap();
    }
    asset_ids.iter().map(|s| (*s).to_string()).collect()
}

fn version_of(fix: &Fixture, asset_id: &str) -> u64 {
    fix.ledger.get(asset_id).unwrap().version
}

fn status_of(fix: &Fixture, asset_id: &str) -> AssetStatus {
    fix.ledger.get(asset_id).unwrap().state.status
}

// ============================================================================
// Store
// ============================================================================

#[test]
fn test_store_put_duplicate_conflicts() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1"]);
    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c1")
        .unwrap();

    let err = fix.store.put(t).unwrap_err();
    assert!(err.is_conflict());
}

#[test]
fn test_store_find_by_change_id_matches_any_phase() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1"]);
    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c1")
        .unwrap();
    fix.fsm.commit(ACTOR, &t.transition_id, "c2").unwrap();

    assert_eq!(
        fix.store.find_by_change_id("c1").unwrap().transition_id,
        t.transition_id
    );
    assert_eq!(
        fix.store.find_by_change_id("c2").unwrap().transition_id,
        t.transition_id
    );
    assert!(fix.store.find_by_change_id("c999").is_none());
}

// ============================================================================
// Scenario: happy path (prepare -> commit -> confirm)
// ============================================================================

#[test]
fn test_happy_path_staged_handoff() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1", "aid_2"]);

    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_origin", "sid_destination", &assets, "c1")
        .unwrap();
    assert_eq!(t.status, TransitionStatus::Prepared);
    assert_eq!(status_of(&fix, "aid_1"), AssetStatus::Escrow);
    assert_eq!(status_of(&fix, "aid_2"), AssetStatus::Escrow);

    let t2 = fix.fsm.commit(ACTOR, &t.transition_id, "c2").unwrap();
    assert_eq!(t2.status, TransitionStatus::Committed);
    assert_eq!(t2.change_id_commit.as_deref(), Some("c2"));

    let t3 = fix.fsm.confirm(ACTOR, &t.transition_id, "c3").unwrap();
    assert_eq!(t3.status, TransitionStatus::Confirmed);
    assert_eq!(t3.change_id_confirm.as_deref(), Some("c3"));
    assert_eq!(status_of(&fix, "aid_1"), AssetStatus::Active);
    assert_eq!(status_of(&fix, "aid_2"), AssetStatus::Active);
    // Exactly two mutations per asset: escrow hold, escrow release.
    assert_eq!(version_of(&fix, "aid_1"), 3);
    assert_eq!(version_of(&fix, "aid_2"), 3);
    // Escrow index entries are gone; the assets can be escrowed again.
    assert!(fix.escrow.escrow_for_asset("aid_1").is_none());
    assert!(fix.escrow.escrow_for_asset("aid_2").is_none());

    assert_eq!(fix.audit.count_of("transition.started"), 1);
    assert_eq!(fix.audit.count_of("asset.escrowed"), 2);
    assert_eq!(fix.audit.count_of("transition.committed"), 1);
    assert_eq!(fix.audit.count_of("transition.confirmed"), 1);
    assert_eq!(fix.audit.count_of("asset.released"), 2);
}

// ============================================================================
// Scenario: destination failure -> rollback after commit
// ============================================================================

#[test]
fn test_rollback_after_commit_restores_assets() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1", "aid_2"]);

    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_origin", "sid_destination", &assets, "c1")
        .unwrap();
    fix.fsm.commit(ACTOR, &t.transition_id, "c2").unwrap();

    let t3 = fix
        .fsm
        .rollback(
            ACTOR,
            &t.transition_id,
            "c4",
            "destination_hydration_failed",
        )
        .unwrap();
    assert_eq!(t3.status, TransitionStatus::RolledBack);
    assert_eq!(
        t3.failure_reason.as_deref(),
        Some("destination_hydration_failed")
    );
    assert_eq!(status_of(&fix, "aid_1"), AssetStatus::Active);
    assert_eq!(status_of(&fix, "aid_2"), AssetStatus::Active);
    assert!(fix.escrow.escrow_for_asset("aid_1").is_none());
    assert!(fix.escrow.escrow_for_asset("aid_2").is_none());
    assert_eq!(fix.audit.count_of("transition.rolled_back"), 1);
}

// ============================================================================
// Scenario: double prepare
// ============================================================================

#[test]
fn test_prepare_replay_same_change_id_is_idempotent() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1"]);

    let first = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c5")
        .unwrap();
    let versions_after_first = version_of(&fix, "aid_1");
    let replay = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c5")
        .unwrap();

    assert_eq!(replay.transition_id, first.transition_id);
    assert_eq!(version_of(&fix, "aid_1"), versions_after_first);
    assert_eq!(fix.store.len(), 1);
    // No second started event.
    assert_eq!(fix.audit.count_of("transition.started"), 1);
}

#[test]
fn test_double_prepare_new_change_id_conflicts_on_escrow() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_3"]);

    fix.fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c5")
        .unwrap();
    // A different transition attempt over the same asset set must fail:
    // aid_3 is already escrowed.
    let err = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c6")
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(fix.store.len(), 1);
}

// ============================================================================
// Validation and phase preconditions
// ============================================================================

#[test]
fn test_prepare_rejects_empty_inputs() {
    let fix = fixture();
    let assets: Vec<String> = Vec::new();

    assert!(fix
        .fsm
        .prepare(ACTOR, "", "sid_a", "sid_b", &assets, "c1")
        .unwrap_err()
        .is_validation());
    assert!(fix
        .fsm
        .prepare(ACTOR, PID, "", "sid_b", &assets, "c1")
        .unwrap_err()
        .is_validation());
    assert!(fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "", &assets, "c1")
        .unwrap_err()
        .is_validation());
    assert!(fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "")
        .unwrap_err()
        .is_validation());
}

#[test]
fn test_commit_unknown_transition_is_not_found() {
    let fix = fixture();
    let err = fix.fsm.commit(ACTOR, "tx_missing", "c2").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_commit_is_forward_idempotent() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1"]);
    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c1")
        .unwrap();

    let first = fix.fsm.commit(ACTOR, &t.transition_id, "c2").unwrap();
    let replay = fix.fsm.commit(ACTOR, &t.transition_id, "c2").unwrap();
    assert_eq!(replay, first);
    // Exactly one committed event despite two calls.
    assert_eq!(fix.audit.count_of("transition.committed"), 1);
}

#[test]
fn test_confirm_requires_committed() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1"]);
    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c1")
        .unwrap();

    let err = fix.fsm.confirm(ACTOR, &t.transition_id, "c3").unwrap_err();
    assert!(err.is_conflict());
    // Escrow untouched by the failed confirm.
    assert_eq!(status_of(&fix, "aid_1"), AssetStatus::Escrow);
}

#[test]
fn test_confirm_replay_makes_no_further_calls() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1"]);
    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c1")
        .unwrap();
    fix.fsm.commit(ACTOR, &t.transition_id, "c2").unwrap();

    let first = fix.fsm.confirm(ACTOR, &t.transition_id, "c3").unwrap();
    let version_after_first = version_of(&fix, "aid_1");
    let replay = fix.fsm.confirm(ACTOR, &t.transition_id, "c3").unwrap();

    assert_eq!(replay, first);
    assert_eq!(version_of(&fix, "aid_1"), version_after_first);
    assert_eq!(fix.audit.count_of("transition.confirmed"), 1);
    assert_eq!(fix.audit.count_of("asset.released"), 1);
}

#[test]
fn test_rollback_replay_makes_no_further_calls() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1"]);
    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c1")
        .unwrap();

    let first = fix
        .fsm
        .rollback(ACTOR, &t.transition_id, "c4", "player_cancelled")
        .unwrap();
    let version_after_first = version_of(&fix, "aid_1");
    let replay = fix
        .fsm
        .rollback(ACTOR, &t.transition_id, "c4", "player_cancelled")
        .unwrap();

    assert_eq!(replay, first);
    assert_eq!(version_of(&fix, "aid_1"), version_after_first);
    assert_eq!(fix.audit.count_of("transition.rolled_back"), 1);
}

#[test]
fn test_rollback_confirmed_is_refused() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1"]);
    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c1")
        .unwrap();
    fix.fsm.commit(ACTOR, &t.transition_id, "c2").unwrap();
    fix.fsm.confirm(ACTOR, &t.transition_id, "c3").unwrap();

    let err = fix
        .fsm
        .rollback(ACTOR, &t.transition_id, "c4", "too_late")
        .unwrap_err();
    assert!(err.is_conflict());
    let current = fix.store.get(&t.transition_id).unwrap();
    assert_eq!(current.status, TransitionStatus::Confirmed);
}

#[test]
fn test_rollback_from_prepared_skips_commit() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1"]);
    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c1")
        .unwrap();

    let rolled = fix
        .fsm
        .rollback(ACTOR, &t.transition_id, "c4", "player_cancelled")
        .unwrap();
    assert_eq!(rolled.status, TransitionStatus::RolledBack);
    assert_eq!(status_of(&fix, "aid_1"), AssetStatus::Active);
}

#[test]
fn test_updated_at_advances_per_phase() {
    let fix = fixture();
    let assets = seed_assets(&fix, &["aid_1"]);
    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c1")
        .unwrap();
    assert_eq!(t.updated_at_ms, 1_000);

    fix.clock.set(2_000);
    let t2 = fix.fsm.commit(ACTOR, &t.transition_id, "c2").unwrap();
    assert_eq!(t2.updated_at_ms, 2_000);
    assert_eq!(t2.created_at_ms, 1_000);
}

// ============================================================================
// Transition table property
// ============================================================================

/// The three phases that act on an existing transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Commit,
    Confirm,
    Rollback,
}

/// Drives a fresh transition into `status` through the real flows.
fn seeded_transition(fix: &Fixture, status: TransitionStatus) -> String {
    let assets = seed_assets(fix, &["aid_table"]);
    let t = fix
        .fsm
        .prepare(ACTOR, PID, "sid_a", "sid_b", &assets, "c_prep")
        .unwrap();
    match status {
        TransitionStatus::Prepared => {}
        TransitionStatus::Committed => {
            fix.fsm.commit(ACTOR, &t.transition_id, "c_commit").unwrap();
        }
        TransitionStatus::Confirmed => {
            fix.fsm.commit(ACTOR, &t.transition_id, "c_commit").unwrap();
            fix.fsm
                .confirm(ACTOR, &t.transition_id, "c_confirm")
                .unwrap();
        }
        TransitionStatus::RolledBack => {
            fix.fsm
                .rollback(ACTOR, &t.transition_id, "c_rb", "seeded")
                .unwrap();
        }
    }
    t.transition_id
}

fn arb_status() -> impl Strategy<Value = TransitionStatus> {
    prop_oneof![
        Just(TransitionStatus::Prepared),
        Just(TransitionStatus::Committed),
        Just(TransitionStatus::Confirmed),
        Just(TransitionStatus::RolledBack),
    ]
}

fn arb_phase() -> impl Strategy<Value = Phase> {
    prop_oneof![Just(Phase::Commit), Just(Phase::Confirm), Just(Phase::Rollback)]
}

proptest! {
    /// Every (current status, phase) pair behaves per the transition table:
    /// legal moves advance, replays return the current record, everything
    /// else conflicts, and conflicts never change the stored status.
    #[test]
    fn prop_phase_against_status_follows_table(status in arb_status(), phase in arb_phase()) {
        let fix = fixture();
        let transition_id = seeded_transition(&fix, status);

        let outcome = match phase {
            Phase::Commit => fix.fsm.commit(ACTOR, &transition_id, "c_probe"),
            Phase::Confirm => fix.fsm.confirm(ACTOR, &transition_id, "c_probe"),
            Phase::Rollback => fix.fsm.rollback(ACTOR, &transition_id, "c_probe", "probe"),
        };

        let expected = match (status, phase) {
            // Legal advances.
            (TransitionStatus::Prepared, Phase::Commit) => Ok(TransitionStatus::Committed),
            (TransitionStatus::Committed, Phase::Confirm) => Ok(TransitionStatus::Confirmed),
            (TransitionStatus::Prepared | TransitionStatus::Committed, Phase::Rollback) => {
                Ok(TransitionStatus::RolledBack)
            }
            // Forward-idempotent no-ops.
            (TransitionStatus::Committed, Phase::Commit) => Ok(TransitionStatus::Committed),
            (TransitionStatus::Confirmed, Phase::Commit | Phase::Confirm) => {
                Ok(TransitionStatus::Confirmed)
            }
            (TransitionStatus::RolledBack, Phase::Rollback) => Ok(TransitionStatus::RolledBack),
            // Everything else is a conflict.
            _ => Err(()),
        };

        match expected {
            Ok(expected_status) => {
                let record = outcome.expect("phase should succeed");
                prop_assert_eq!(record.status, expected_status);
            }
            Err(()) => {
                let err = outcome.expect_err("phase should conflict");
                prop_assert!(err.is_conflict());
                let current = fix.store.get(&transition_id).unwrap();
                prop_assert_eq!(current.status, status);
            }
        }
    }
}
