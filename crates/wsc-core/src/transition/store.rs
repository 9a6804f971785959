//! Transition record persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::json;

use super::state::ShardTransition;
use crate::error::{WscError, WscResult};

/// Transform applied to a transition record under the store's update lock.
pub type TransitionTransform<'a> =
    &'a mut dyn FnMut(&ShardTransition) -> WscResult<ShardTransition>;

/// Keyed persistence for transition records.
///
/// Only the FSM writes through this trait; orchestration layers read.
pub trait TransitionStore: Send + Sync {
    /// Returns the transition, if present.
    fn get(&self, transition_id: &str) -> Option<ShardTransition>;

    /// Inserts a new transition.
    ///
    /// # Errors
    ///
    /// Returns Conflict if the id already exists.
    fn put(&self, transition: ShardTransition) -> WscResult<()>;

    /// Atomically applies `transform` to an existing transition.
    ///
    /// # Errors
    ///
    /// Returns NotFound if the transition is absent; transform failures
    /// propagate without mutating state.
    fn update(
        &self,
        transition_id: &str,
        transform: TransitionTransform<'_>,
    ) -> WscResult<ShardTransition>;

    /// Returns the transition that recorded `change_id` in any phase, if
    /// one exists. Phase idempotency in the FSM depends on this lookup.
    fn find_by_change_id(&self, change_id: &str) -> Option<ShardTransition>;
}

/// Reference in-memory transition store.
#[derive(Default)]
pub struct InMemoryTransitionStore {
    transitions: Mutex<HashMap<String, ShardTransition>>,
}

impl InMemoryTransitionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransitionStore for InMemoryTransitionStore {
    fn get(&self, transition_id: &str) -> Option<ShardTransition> {
        self.transitions
            .lock()
            .ok()
            .and_then(|m| m.get(transition_id).cloned())
    }

    fn put(&self, transition: ShardTransition) -> WscResult<()> {
        let mut transitions = self
            .transitions
            .lock()
            .map_err(|_| WscError::transition("Transition store poisoned."))?;
        if transitions.contains_key(&transition.transition_id) {
            return Err(WscError::conflict_with(
                "Transition exists.",
                json!({ "transition_id": transition.transition_id }),
            ));
        }
        transitions.insert(transition.transition_id.clone(), transition);
        Ok(())
    }

    fn update(
        &self,
        transition_id: &str,
        transform: TransitionTransform<'_>,
    ) -> WscResult<ShardTransition> {
        let mut transitions = self
            .transitions
            .lock()
            .map_err(|_| WscError::transition("Transition store poisoned."))?;
        let current = transitions.get(transition_id).ok_or_else(|| {
            WscError::not_found_with(
                "Transition not found.",
                json!({ "transition_id": transition_id }),
            )
        })?;
        let next = transform(current)?;
        transitions.insert(transition_id.to_string(), next.clone());
        Ok(next)
    }

    fn find_by_change_id(&self, change_id: &str) -> Option<ShardTransition> {
        self.transitions
            .lock()
            .ok()
            .and_then(|m| m.values().find(|t| t.has_change_id(change_id)).cloned())
    }
}
