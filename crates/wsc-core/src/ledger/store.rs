//! Ledger storage boundary and reference implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;

use super::record::AssetRecord;
use crate::clock::Clock;
use crate::error::{WscError, WscResult};

/// Transform applied to an asset record under the change-id gate.
pub type AssetTransform<'a> = &'a mut dyn FnMut(&AssetRecord) -> WscResult<AssetRecord>;

/// Per-asset record store with atomic, idempotent mutation.
///
/// A conforming implementation must serialize operations per asset id
/// (compare-and-set on version/`last_change_id`, or equivalent) and honor
/// the change-id gate described on [`mutate`](Self::mutate).
pub trait AssetLedger: Send + Sync {
    /// Returns the asset record, if present.
    fn get(&self, asset_id: &str) -> Option<AssetRecord>;

    /// Applies `transform` to the asset under the change-id gate.
    ///
    /// If the asset's recorded `last_change_id` equals `change_id` the
    /// current record is returned unchanged and the transform is not
    /// invoked. Otherwise the transform runs, the version counter advances
    /// by one, and `last_change_id` plus the update timestamps are
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Returns NotFound if the asset is absent. Transform failures (for
    /// example Conflict when the asset is not in the status the operation
    /// requires) propagate without mutating state.
    fn mutate(
        &self,
        asset_id: &str,
        change_id: &str,
        transform: AssetTransform<'_>,
    ) -> WscResult<AssetRecord>;
}

/// Reference in-memory ledger.
///
/// A single mutex serializes all operations, which satisfies the per-key
/// atomicity contract for a reference implementation; a networked
/// deployment must provide the same guarantee per asset id.
pub struct InMemoryAssetLedger {
    assets: Mutex<HashMap<String, AssetRecord>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryAssetLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            assets: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Inserts a record that does not yet exist.
    ///
    /// # Errors
    ///
    /// Returns Conflict if the asset id is already present.
    pub fn seed(&self, asset: AssetRecord) -> WscResult<()> {
        let mut assets = self
            .assets
            .lock()
            .map_err(|_| WscError::transition("Asset ledger poisoned."))?;
        if assets.contains_key(&asset.asset_id) {
            return Err(WscError::conflict_with(
                "Asset already exists.",
                json!({ "asset_id": asset.asset_id }),
            ));
        }
        assets.insert(asset.asset_id.clone(), asset);
        Ok(())
    }

    /// Number of stored assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn get(&self, asset_id: &str) -> Option<AssetRecord> {
        self.assets
            .lock()
            .ok()
            .and_then(|m| m.get(asset_id).cloned())
    }

    fn mutate(
        &self,
        asset_id: &str,
        change_id: &str,
        transform: AssetTransform<'_>,
    ) -> WscResult<AssetRecord> {
        let mut assets = self
            .assets
            .lock()
            .map_err(|_| WscError::transition("Asset ledger poisoned."))?;
        let current = assets.get(asset_id).ok_or_else(|| {
            WscError::not_found_with("Asset not found.", json!({ "asset_id": asset_id }))
        })?;

        if current.last_change_id == change_id {
            return Ok(current.clone());
        }

        let mut next = transform(current)?;
        let now_ms = self.clock.now_ms();
        next.version = current.version + 1;
        next.last_change_id = change_id.to_string();
        next.last_changed_at_ms = Some(now_ms);
        next.lifecycle.updated_at_ms = Some(now_ms);
        assets.insert(asset_id.to_string(), next.clone());
        Ok(next)
    }
}
