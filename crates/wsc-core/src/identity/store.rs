//! Identity storage boundary.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;

use super::types::PlayerIdentity;
use crate::clock::Clock;
use crate::error::{WscError, WscResult};

/// Transform applied to an identity record under a change-id gate.
pub type IdentityTransform<'a> = &'a mut dyn FnMut(&PlayerIdentity) -> WscResult<PlayerIdentity>;

/// Keyed identity persistence.
///
/// A conforming store must serialize operations per identity id and honor the
/// change-id gate on `mutate`.
pub trait IdentityStore: Send + Sync {
    /// Returns the identity, if present.
    fn get(&self, identity_id: &str) -> Option<PlayerIdentity>;

    /// Inserts a new identity.
    ///
    /// # Errors
    ///
    /// Returns Conflict if the id already exists.
    fn put(&self, identity: PlayerIdentity) -> WscResult<()>;

    /// Applies `transform` to the identity under the change-id gate.
    ///
    /// A `change_id` equal to the record's last applied change id returns the
    /// current record unchanged without invoking the transform.
    ///
    /// # Errors
    ///
    /// Returns NotFound if the identity is absent; transform failures
    /// propagate without mutating state.
    fn mutate(
        &self,
        identity_id: &str,
        change_id: &str,
        transform: IdentityTransform<'_>,
    ) -> WscResult<PlayerIdentity>;
}

/// Reference in-memory identity store.
///
/// A single mutex serializes all operations, which satisfies the per-key
/// atomicity contract for a reference implementation.
pub struct InMemoryIdentityStore {
    identities: Mutex<HashMap<String, PlayerIdentity>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryIdentityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            identities: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identities.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn get(&self, identity_id: &str) -> Option<PlayerIdentity> {
        self.identities
            .lock()
            .ok()
            .and_then(|m| m.get(identity_id).cloned())
    }

    fn put(&self, identity: PlayerIdentity) -> WscResult<()> {
        let mut identities = self
            .identities
            .lock()
            .map_err(|_| WscError::transition("Identity store poisoned."))?;
        if identities.contains_key(&identity.identity_id) {
            return Err(WscError::conflict_with(
                "Identity already exists.",
                json!({ "identity_id": identity.identity_id }),
            ));
        }
        identities.insert(identity.identity_id.clone(), identity);
        Ok(())
    }

    fn mutate(
        &self,
        identity_id: &str,
        change_id: &str,
        transform: IdentityTransform<'_>,
    ) -> WscResult<PlayerIdentity> {
        let mut identities = self
            .identities
            .lock()
            .map_err(|_| WscError::transition("Identity store poisoned."))?;
        let current = identities.get(identity_id).ok_or_else(|| {
            WscError::not_found_with(
                "Identity not found.",
                json!({ "identity_id": identity_id }),
            )
        })?;

        if current.audit.last_change_id.as_deref() == Some(change_id) {
            return Ok(current.clone());
        }

        let mut next = transform(current)?;
        next.updated_at_ms = Some(self.clock.now_ms());
        next.audit.last_change_id = Some(change_id.to_string());
        identities.insert(identity_id.to_string(), next.clone());
        Ok(next)
    }
}
