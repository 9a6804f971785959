//! Escrow service implementation.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tracing::warn;

use super::state::{EscrowGroup, EscrowRecord, EscrowStatus};
use crate::clock::Clock;
use crate::error::{WscError, WscResult};
use crate::ids::{new_id, IdPrefix};
use crate::ledger::{AssetLedger, AssetStatus};

/// Indexes guarded by the service mutex.
#[derive(Default)]
struct EscrowIndex {
    /// escrow id -> record (settled records are retained).
    escrows: HashMap<String, EscrowRecord>,
    /// asset id -> its currently held escrow id.
    asset_index: HashMap<String, String>,
    /// lock change id -> group.
    groups: HashMap<String, EscrowGroup>,
}

/// Custodies assets during transitions.
///
/// The service is the only writer of `active <-> escrow` status flips on the
/// ledger, and the exclusive owner of [`EscrowRecord`] mutation. One mutex
/// serializes the three internal indexes; ledger calls are made while it is
/// held, which keeps the check-then-mutate sequences of
/// [`hold_asset`](Self::hold_asset) atomic in the reference composition.
pub struct EscrowService {
    index: Mutex<EscrowIndex>,
    ledger: Arc<dyn AssetLedger>,
    clock: Arc<dyn Clock>,
}

impl EscrowService {
    /// Creates a service over the given ledger.
    #[must_use]
    pub fn new(ledger: Arc<dyn AssetLedger>, clock: Arc<dyn Clock>) -> Self {
        Self {
            index: Mutex::new(EscrowIndex::default()),
            ledger,
            clock,
        }
    }

    /// Returns the escrow record by id, if present.
    #[must_use]
    pub fn get(&self, escrow_id: &str) -> Option<EscrowRecord> {
        self.index
            .lock()
            .ok()
            .and_then(|idx| idx.escrows.get(escrow_id).cloned())
    }

    /// Returns the currently held escrow for an asset, if any.
    #[must_use]
    pub fn escrow_for_asset(&self, asset_id: &str) -> Option<EscrowRecord> {
        self.index.lock().ok().and_then(|idx| {
            idx.asset_index
                .get(asset_id)
                .and_then(|eid| idx.escrows.get(eid))
                .cloned()
        })
    }

    /// Returns `true` if a group is recorded under `change_id`.
    #[must_use]
    pub fn has_group(&self, change_id: &str) -> bool {
        self.index
            .lock()
            .map(|idx| idx.groups.contains_key(change_id))
            .unwrap_or(false)
    }

    /// Number of currently held escrows.
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.index.lock().map(|idx| idx.asset_index.len()).unwrap_or(0)
    }

    /// Places a single asset into custody.
    ///
    /// # Errors
    ///
    /// - Conflict if the asset already has a held escrow, or its ledger
    ///   status is not `active`
    /// - Security if the asset does not exist or `owner_id` is not its owner
    pub fn hold_asset(
        &self,
        asset_id: &str,
        owner_id: &str,
        change_id: &str,
    ) -> WscResult<EscrowRecord> {
        let mut index = self.lock_index()?;
        self.hold_locked(&mut index, asset_id, owner_id, change_id)
    }

    /// Releases a single asset from custody, restoring it to `active`.
    ///
    /// Settled escrows are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns Conflict if the asset has no active escrow.
    pub fn release_asset(&self, asset_id: &str, change_id: &str) -> WscResult<EscrowRecord> {
        let mut index = self.lock_index()?;
        self.settle_locked(&mut index, asset_id, change_id, Settlement::Release)
    }

    /// Rolls a single asset back out of custody, restoring it to `active`
    /// and recording `reason` on the ledger record.
    ///
    /// Settled escrows are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns Conflict if the asset has no active escrow.
    pub fn rollback_asset(
        &self,
        asset_id: &str,
        change_id: &str,
        reason: &str,
    ) -> WscResult<EscrowRecord> {
        let mut index = self.lock_index()?;
        self.settle_locked(
            &mut index,
            asset_id,
            change_id,
            Settlement::Rollback {
                reason: reason.to_string(),
            },
        )
    }

    /// Locks a set of assets together under `change_id`.
    ///
    /// Re-issuing the lock with the same change id and the same asset set is
    /// an idempotent replay returning the existing escrows. A partially
    /// failed lock rolls back every hold acquired in this call before the
    /// original error propagates, so no asset is left stuck in escrow.
    ///
    /// # Errors
    ///
    /// - Security if `owner_id` is empty
    /// - Conflict if `change_id` is empty, or was already used to lock a
    ///   different asset set, or any individual hold fails
    pub fn lock(
        &self,
        owner_id: &str,
        asset_ids: &[String],
        change_id: &str,
    ) -> WscResult<Vec<EscrowRecord>> {
        if owner_id.is_empty() {
            return Err(WscError::security("owner_id required for escrow lock."));
        }
        if change_id.is_empty() {
            return Err(WscError::conflict("change_id required for escrow lock."));
        }

        let mut index = self.lock_index()?;

        if let Some(group) = index.groups.get(change_id) {
            let requested: BTreeSet<&str> = asset_ids.iter().map(String::as_str).collect();
            let existing: BTreeSet<&str> = group.asset_ids.iter().map(String::as_str).collect();
            if requested != existing {
                return Err(WscError::conflict_with(
                    "change_id already used to lock a different asset set.",
                    json!({ "change_id": change_id }),
                ));
            }
            let escrow_ids = group.escrow_ids.clone();
            return Ok(escrow_ids
                .iter()
                .filter_map(|eid| index.escrows.get(eid).cloned())
                .collect());
        }

        let mut acquired: Vec<EscrowRecord> = Vec::with_capacity(asset_ids.len());
        for asset_id in asset_ids {
            match self.hold_locked(&mut index, asset_id, owner_id, change_id) {
                Ok(escrow) => acquired.push(escrow),
                Err(err) => {
                    self.compensate_partial_lock(&mut index, &acquired, change_id);
                    return Err(err);
                }
            }
        }

        index.groups.insert(
            change_id.to_string(),
            EscrowGroup {
                owner_id: owner_id.to_string(),
                asset_ids: asset_ids.to_vec(),
                escrow_ids: acquired.iter().map(|e| e.escrow_id.clone()).collect(),
            },
        );
        Ok(acquired)
    }

    /// Releases every asset locked under `lock_change_id`.
    ///
    /// Ledger mutations are keyed by `release_change_id`, which must differ
    /// from the lock change id (the lock consumed that id on each asset).
    /// A missing group is an idempotent no-op returning an empty list;
    /// escrows already settled by an earlier partial release are skipped
    /// but still returned.
    ///
    /// # Errors
    ///
    /// Returns Security if `owner_id` does not match the group owner.
    pub fn release(
        &self,
        owner_id: &str,
        lock_change_id: &str,
        release_change_id: &str,
    ) -> WscResult<Vec<EscrowRecord>> {
        self.settle_group(
            owner_id,
            lock_change_id,
            release_change_id,
            Settlement::Release,
        )
    }

    /// Rolls back every asset locked under `lock_change_id`, recording
    /// `reason`. Same idempotency shape as [`release`](Self::release).
    ///
    /// # Errors
    ///
    /// Returns Security if `owner_id` does not match the group owner.
    pub fn rollback(
        &self,
        owner_id: &str,
        lock_change_id: &str,
        rollback_change_id: &str,
        reason: &str,
    ) -> WscResult<Vec<EscrowRecord>> {
        self.settle_group(
            owner_id,
            lock_change_id,
            rollback_change_id,
            Settlement::Rollback {
                reason: reason.to_string(),
            },
        )
    }

    fn lock_index(&self) -> WscResult<std::sync::MutexGuard<'_, EscrowIndex>> {
        self.index
            .lock()
            .map_err(|_| WscError::transition("Escrow index poisoned."))
    }

    fn hold_locked(
        &self,
        index: &mut EscrowIndex,
        asset_id: &str,
        owner_id: &str,
        change_id: &str,
    ) -> WscResult<EscrowRecord> {
        if let Some(existing) = index.asset_index.get(asset_id) {
            return Err(WscError::conflict_with(
                "Asset already escrowed.",
                json!({ "asset_id": asset_id, "escrow_id": existing }),
            ));
        }

        let asset = self.ledger.get(asset_id).ok_or_else(|| {
            WscError::security_with(
                "Cannot escrow non-existent asset.",
                json!({ "asset_id": asset_id }),
            )
        })?;
        if asset.owner.owner_id != owner_id {
            return Err(WscError::security_with(
                "Only the owner can escrow an asset.",
                json!({ "asset_id": asset_id }),
            ));
        }

        self.ledger.mutate(asset_id, change_id, &mut |cur| {
            if cur.state.status != AssetStatus::Active {
                return Err(WscError::conflict_with(
                    "Asset must be active to escrow.",
                    json!({ "asset_id": asset_id, "status": cur.state.status.as_str() }),
                ));
            }
            let mut next = cur.clone();
            next.state.status = AssetStatus::Escrow;
            Ok(next)
        })?;

        let escrow = EscrowRecord {
            escrow_id: new_id(IdPrefix::Tx),
            asset_id: asset_id.to_string(),
            owner_id: owner_id.to_string(),
            status: EscrowStatus::Held,
            created_at_ms: self.clock.now_ms(),
            released_at_ms: None,
        };
        index
            .escrows
            .insert(escrow.escrow_id.clone(), escrow.clone());
        index
            .asset_index
            .insert(asset_id.to_string(), escrow.escrow_id.clone());
        Ok(escrow)
    }

    fn settle_locked(
        &self,
        index: &mut EscrowIndex,
        asset_id: &str,
        change_id: &str,
        settlement: Settlement,
    ) -> WscResult<EscrowRecord> {
        let escrow_id = index
            .asset_index
            .get(asset_id)
            .cloned()
            .ok_or_else(|| {
                WscError::conflict_with("Asset not escrowed.", json!({ "asset_id": asset_id }))
            })?;
        let escrow = index
            .escrows
            .get(&escrow_id)
            .cloned()
            .ok_or_else(|| WscError::transition("Escrow index out of sync."))?;
        if escrow.status.is_settled() {
            return Ok(escrow);
        }

        self.settle_escrow_locked(index, &escrow_id, change_id, &settlement)
    }

    /// Flips the ledger status back to `active` and marks the escrow
    /// settled. The escrow must currently be held.
    fn settle_escrow_locked(
        &self,
        index: &mut EscrowIndex,
        escrow_id: &str,
        change_id: &str,
        settlement: &Settlement,
    ) -> WscResult<EscrowRecord> {
        let escrow = index
            .escrows
            .get(escrow_id)
            .cloned()
            .ok_or_else(|| WscError::transition("Escrow index out of sync."))?;

        self.ledger.mutate(&escrow.asset_id, change_id, &mut |cur| {
            if cur.state.status != AssetStatus::Escrow {
                return Ok(cur.clone());
            }
            let mut next = cur.clone();
            next.state.status = AssetStatus::Active;
            if let Settlement::Rollback { reason } = settlement {
                next.state.state_reason = Some(reason.clone());
            }
            Ok(next)
        })?;

        let mut settled = escrow;
        settled.status = match settlement {
            Settlement::Release => EscrowStatus::Released,
            Settlement::Rollback { .. } => EscrowStatus::RolledBack,
        };
        settled.released_at_ms = Some(self.clock.now_ms());
        index
            .escrows
            .insert(settled.escrow_id.clone(), settled.clone());
        index.asset_index.remove(&settled.asset_id);
        Ok(settled)
    }

    fn settle_group(
        &self,
        owner_id: &str,
        lock_change_id: &str,
        settle_change_id: &str,
        settlement: Settlement,
    ) -> WscResult<Vec<EscrowRecord>> {
        let mut index = self.lock_index()?;

        let Some(group) = index.groups.get(lock_change_id).cloned() else {
            return Ok(Vec::new());
        };
        if group.owner_id != owner_id {
            return Err(WscError::security_with(
                "Only the lock owner can settle an escrow group.",
                json!({ "change_id": lock_change_id }),
            ));
        }

        let mut settled = Vec::with_capacity(group.escrow_ids.len());
        for escrow_id in &group.escrow_ids {
            let Some(current) = index.escrows.get(escrow_id).cloned() else {
                continue;
            };
            if current.status.is_settled() {
                settled.push(current);
                continue;
            }
            // The group stays recorded if a settlement fails part-way, so a
            // retry picks up the still-held remainder.
            let record =
                self.settle_escrow_locked(&mut index, escrow_id, settle_change_id, &settlement)?;
            settled.push(record);
        }

        index.groups.remove(lock_change_id);
        Ok(settled)
    }

    /// Best-effort rollback of holds acquired by a failed group lock.
    /// Failures are logged and never mask the lock error.
    fn compensate_partial_lock(
        &self,
        index: &mut EscrowIndex,
        acquired: &[EscrowRecord],
        change_id: &str,
    ) {
        let compensation_change_id = format!("{change_id}:rollback");
        for escrow in acquired {
            let outcome = self.settle_escrow_locked(
                index,
                &escrow.escrow_id,
                &compensation_change_id,
                &Settlement::Rollback {
                    reason: "lock_compensation".to_string(),
                },
            );
            if let Err(err) = outcome {
                warn!(
                    target: "wsc::escrow",
                    asset_id = %escrow.asset_id,
                    escrow_id = %escrow.escrow_id,
                    %err,
                    "escrow compensation failed during partial lock rollback"
                );
            }
        }
    }
}

/// How a settlement leaves the ledger record.
#[derive(Debug, Clone)]
enum Settlement {
    Release,
    Rollback { reason: String },
}
