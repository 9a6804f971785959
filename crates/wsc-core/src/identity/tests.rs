//! Tests for the identity store.

use std::sync::Arc;

use super::*;
use crate::clock::ManualClock;
use crate::identity::types::IdentityStatus;

fn store_at(now_ms: u64) -> (InMemoryIdentityStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now_ms));
    (InMemoryIdentityStore::new(clock.clone()), clock)
}

#[test]
fn test_put_then_get() {
    let (store, _clock) = store_at(1_000);
    let identity = PlayerIdentity::seeded("pid_0123456789", "tests", 1_000);
    store.put(identity.clone()).unwrap();

    let fetched = store.get("pid_0123456789").unwrap();
    assert_eq!(fetched, identity);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_put_duplicate_conflicts() {
    let (store, _clock) = store_at(1_000);
    let identity = PlayerIdentity::seeded("pid_0123456789", "tests", 1_000);
    store.put(identity.clone()).unwrap();

    let err = store.put(identity).unwrap_err();
    assert!(err.is_conflict());
}

#[test]
fn test_mutate_applies_and_stamps() {
    let (store, clock) = store_at(1_000);
    store
        .put(PlayerIdentity::seeded("pid_0123456789", "tests", 1_000))
        .unwrap();
    clock.set(2_000);

    let updated = store
        .mutate("pid_0123456789", "chg_suspend_1", &mut |cur| {
            let mut next = cur.clone();
            next.status = IdentityStatus::Suspended;
            Ok(next)
        })
        .unwrap();

    assert_eq!(updated.status, IdentityStatus::Suspended);
    assert_eq!(updated.updated_at_ms, Some(2_000));
    assert_eq!(updated.audit.last_change_id.as_deref(), Some("chg_suspend_1"));
}

#[test]
fn test_mutate_replay_is_noop() {
    let (store, _clock) = store_at(1_000);
    store
        .put(PlayerIdentity::seeded("pid_0123456789", "tests", 1_000))
        .unwrap();

    store
        .mutate("pid_0123456789", "chg_1", &mut |cur| {
            let mut next = cur.clone();
            next.status = IdentityStatus::Suspended;
            Ok(next)
        })
        .unwrap();

    // Same change id: transform must not run again.
    let mut invoked = false;
    let replay = store
        .mutate("pid_0123456789", "chg_1", &mut |cur| {
            invoked = true;
            Ok(cur.clone())
        })
        .unwrap();

    assert!(!invoked);
    assert_eq!(replay.status, IdentityStatus::Suspended);
}

#[test]
fn test_mutate_missing_identity_is_not_found() {
    let (store, _clock) = store_at(1_000);
    let err = store
        .mutate("pid_does_not_exist", "chg_1", &mut |cur| Ok(cur.clone()))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_mutate_transform_failure_leaves_state() {
    let (store, _clock) = store_at(1_000);
    store
        .put(PlayerIdentity::seeded("pid_0123456789", "tests", 1_000))
        .unwrap();

    let err = store
        .mutate("pid_0123456789", "chg_bad", &mut |_cur| {
            Err(crate::error::WscError::conflict("refused"))
        })
        .unwrap_err();
    assert!(err.is_conflict());

    let current = store.get("pid_0123456789").unwrap();
    assert_eq!(current.audit.last_change_id, None);
    assert_eq!(current.status, IdentityStatus::Active);
}
