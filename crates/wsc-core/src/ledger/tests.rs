//! Tests for the asset ledger.

use std::sync::Arc;

use super::*;
use crate::clock::ManualClock;
use crate::error::WscError;

fn ledger_at(now_ms: u64) -> (InMemoryAssetLedger, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now_ms));
    (InMemoryAssetLedger::new(clock.clone()), clock)
}

#[test]
fn test_seed_then_get() {
    let (ledger, _clock) = ledger_at(1_000);
    ledger
        .seed(AssetRecord::seeded("aid_1", "pid_owner", 1_000))
        .unwrap();

    let asset = ledger.get("aid_1").unwrap();
    assert_eq!(asset.version, 1);
    assert_eq!(asset.state.status, AssetStatus::Active);
    assert_eq!(asset.last_change_id, "seed");
}

#[test]
fn test_seed_duplicate_conflicts() {
    let (ledger, _clock) = ledger_at(1_000);
    ledger
        .seed(AssetRecord::seeded("aid_1", "pid_owner", 1_000))
        .unwrap();
    let err = ledger
        .seed(AssetRecord::seeded("aid_1", "pid_owner", 1_000))
        .unwrap_err();
    assert!(err.is_conflict());
}

#[test]
fn test_mutate_advances_version_and_stamps() {
    let (ledger, clock) = ledger_at(1_000);
    ledger
        .seed(AssetRecord::seeded("aid_1", "pid_owner", 1_000))
        .unwrap();
    clock.set(5_000);

    let updated = ledger
        .mutate("aid_1", "chg_1", &mut |cur| {
            let mut next = cur.clone();
            next.state.status = AssetStatus::Escrow;
            Ok(next)
        })
        .unwrap();

    assert_eq!(updated.version, 2);
    assert_eq!(updated.state.status, AssetStatus::Escrow);
    assert_eq!(updated.last_change_id, "chg_1");
    assert_eq!(updated.last_changed_at_ms, Some(5_000));
    assert_eq!(updated.lifecycle.updated_at_ms, Some(5_000));
}

#[test]
fn test_mutate_replay_returns_current_without_transform() {
    let (ledger, _clock) = ledger_at(1_000);
    ledger
        .seed(AssetRecord::seeded("aid_1", "pid_owner", 1_000))
        .unwrap();

    ledger
        .mutate("aid_1", "chg_1", &mut |cur| {
            let mut next = cur.clone();
            next.state.status = AssetStatus::Escrow;
            Ok(next)
        })
        .unwrap();

    let mut invoked = false;
    let replay = ledger
        .mutate("aid_1", "chg_1", &mut |cur| {
            invoked = true;
            Ok(cur.clone())
        })
        .unwrap();

    assert!(!invoked);
    assert_eq!(replay.version, 2);
    assert_eq!(replay.state.status, AssetStatus::Escrow);
}

#[test]
fn test_mutate_missing_asset_is_not_found() {
    let (ledger, _clock) = ledger_at(1_000);
    let err = ledger
        .mutate("aid_absent", "chg_1", &mut |cur| Ok(cur.clone()))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_mutate_transform_conflict_leaves_record() {
    let (ledger, _clock) = ledger_at(1_000);
    ledger
        .seed(AssetRecord::seeded("aid_1", "pid_owner", 1_000))
        .unwrap();

    let err = ledger
        .mutate("aid_1", "chg_1", &mut |_cur| {
            Err(WscError::conflict("Asset must be active to escrow."))
        })
        .unwrap_err();
    assert!(err.is_conflict());

    let current = ledger.get("aid_1").unwrap();
    assert_eq!(current.version, 1);
    assert_eq!(current.last_change_id, "seed");
}

#[test]
fn test_distinct_change_ids_each_advance_version() {
    let (ledger, _clock) = ledger_at(1_000);
    ledger
        .seed(AssetRecord::seeded("aid_1", "pid_owner", 1_000))
        .unwrap();

    for (i, change_id) in ["chg_a", "chg_b", "chg_c"].into_iter().enumerate() {
        let updated = ledger
            .mutate("aid_1", change_id, &mut |cur| Ok(cur.clone()))
            .unwrap();
        assert_eq!(updated.version, 2 + i as u64);
    }
}
