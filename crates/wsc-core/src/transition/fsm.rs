//! The authoritative shard transition state machine.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use super::state::{ShardTransition, TransitionStatus};
use super::store::TransitionStore;
use crate::audit::{AuditEvent, AuditSink};
use crate::clock::Clock;
use crate::error::{WscError, WscResult};
use crate::escrow::EscrowService;
use crate::ids::{new_id, IdPrefix};

/// Authoritative finite-state machine governing shard transitions.
///
/// Owns the lifecycle `PREPARED -> COMMITTED -> CONFIRMED | ROLLED_BACK`
/// (with `PREPARED -> ROLLED_BACK` also legal). The FSM is deliberately
/// strict:
///
/// - all state changes are audited
/// - all asset movement flows through escrow
/// - idempotency is enforced at the FSM boundary: a phase that already ran
///   returns the current record instead of re-applying side effects
///
/// Confirm and rollback are kind-agnostic. The compensating action is
/// identical regardless of why the player is moving shards; only the entry
/// policy differs per transition kind, and that lives in the controllers.
pub struct ShardTransitionFsm {
    transitions: Arc<dyn TransitionStore>,
    escrow: Arc<EscrowService>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl ShardTransitionFsm {
    /// Creates an FSM over the given collaborators.
    #[must_use]
    pub fn new(
        transitions: Arc<dyn TransitionStore>,
        escrow: Arc<EscrowService>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transitions,
            escrow,
            audit,
            clock,
        }
    }

    /// Read access to the transition store for orchestration layers.
    ///
    /// Callers must not mutate transitions directly; all lifecycle changes
    /// go through FSM methods.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TransitionStore> {
        &self.transitions
    }

    /// Prepares a new transition: escrows the protected assets and persists
    /// a `PREPARED` record.
    ///
    /// `change_id` keys the escrow group and is recorded on the transition,
    /// making a retried prepare with the same change id and asset set a
    /// replay that re-escrows nothing and returns the same transition.
    ///
    /// # Errors
    ///
    /// - Validation if `identity_id`, either shard id, or `change_id` is
    ///   empty
    /// - any escrow lock failure (Conflict/Security) propagates verbatim
    pub fn prepare(
        &self,
        actor: &str,
        identity_id: &str,
        from_shard: &str,
        to_shard: &str,
        protected_assets: &[String],
        change_id: &str,
    ) -> WscResult<ShardTransition> {
        if identity_id.is_empty() {
            return Err(WscError::validation("identity_id required."));
        }
        if from_shard.is_empty() || to_shard.is_empty() {
            return Err(WscError::validation("from_shard and to_shard required."));
        }
        if change_id.is_empty() {
            return Err(WscError::validation("change_id required."));
        }

        if let Some(existing) = self.transitions.find_by_change_id(change_id) {
            debug!(
                target: "wsc::fsm",
                transition_id = %existing.transition_id,
                change_id,
                "prepare replayed"
            );
            return Ok(existing);
        }

        let escrows = self.escrow.lock(identity_id, protected_assets, change_id)?;

        let now_ms = self.clock.now_ms();
        let transition = ShardTransition {
            transition_id: new_id(IdPrefix::Tx),
            identity_id: identity_id.to_string(),
            from_shard: from_shard.to_string(),
            to_shard: to_shard.to_string(),
            protected_assets: protected_assets.to_vec(),
            status: TransitionStatus::Prepared,
            change_id_prepare: change_id.to_string(),
            change_id_commit: None,
            change_id_confirm: None,
            failure_reason: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        };
        self.transitions.put(transition.clone())?;

        self.audit.emit(AuditEvent::TransitionStarted {
            at_ms: now_ms,
            actor: actor.to_string(),
            transition_id: transition.transition_id.clone(),
            from: from_shard.to_string(),
            to: to_shard.to_string(),
        });
        for escrow in &escrows {
            self.audit.emit(AuditEvent::AssetEscrowed {
                at_ms: now_ms,
                actor: actor.to_string(),
                asset_id: escrow.asset_id.clone(),
                escrow_id: escrow.escrow_id.clone(),
            });
        }

        Ok(transition)
    }

    /// Commits a prepared transition: the destination has accepted entry,
    /// but the move is still reversible.
    ///
    /// Forward-idempotent: an already committed or confirmed transition is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// - NotFound if the transition id is unknown
    /// - Conflict if the current status is `rolled_back`
    pub fn commit(
        &self,
        actor: &str,
        transition_id: &str,
        change_id: &str,
    ) -> WscResult<ShardTransition> {
        let current = self.require(transition_id)?;

        match current.status {
            TransitionStatus::Committed | TransitionStatus::Confirmed => return Ok(current),
            TransitionStatus::Prepared => {}
            TransitionStatus::RolledBack => {
                return Err(Self::invalid_state("commit", &current));
            }
        }

        let now_ms = self.clock.now_ms();
        let committed = self.transitions.update(transition_id, &mut |cur| {
            let mut next = cur.clone();
            next.status = TransitionStatus::Committed;
            next.change_id_commit = Some(change_id.to_string());
            next.updated_at_ms = now_ms;
            Ok(next)
        })?;

        self.audit.emit(AuditEvent::TransitionCommitted {
            at_ms: now_ms,
            actor: actor.to_string(),
            transition_id: transition_id.to_string(),
        });
        Ok(committed)
    }

    /// Confirms a committed transition: releases the escrow group and makes
    /// the destination authoritative. Irreversible.
    ///
    /// A transition that is already confirmed is returned unchanged without
    /// touching escrow.
    ///
    /// # Errors
    ///
    /// - NotFound if the transition id is unknown
    /// - Conflict if the current status is not `committed`
    pub fn confirm(
        &self,
        actor: &str,
        transition_id: &str,
        change_id: &str,
    ) -> WscResult<ShardTransition> {
        let current = self.require(transition_id)?;

        match current.status {
            TransitionStatus::Confirmed => return Ok(current),
            TransitionStatus::Committed => {}
            TransitionStatus::Prepared | TransitionStatus::RolledBack => {
                return Err(Self::invalid_state("confirm", &current));
            }
        }

        // The group is keyed by the prepare change id; the confirm change id
        // keys the release mutations on the ledger.
        let released = self.escrow.release(
            &current.identity_id,
            &current.change_id_prepare,
            change_id,
        )?;

        let now_ms = self.clock.now_ms();
        let confirmed = self.transitions.update(transition_id, &mut |cur| {
            let mut next = cur.clone();
            next.status = TransitionStatus::Confirmed;
            next.change_id_confirm = Some(change_id.to_string());
            next.updated_at_ms = now_ms;
            Ok(next)
        })?;

        self.audit.emit(AuditEvent::TransitionConfirmed {
            at_ms: now_ms,
            actor: actor.to_string(),
            transition_id: transition_id.to_string(),
        });
        for escrow in &released {
            self.audit.emit(AuditEvent::AssetReleased {
                at_ms: now_ms,
                actor: actor.to_string(),
                asset_id: escrow.asset_id.clone(),
                escrow_id: escrow.escrow_id.clone(),
            });
        }
        Ok(confirmed)
    }

    /// Rolls back a prepared or committed transition: restores the escrowed
    /// assets and returns authority to the source shard.
    ///
    /// A transition that is already rolled back is returned unchanged
    /// without touching escrow.
    ///
    /// # Errors
    ///
    /// - NotFound if the transition id is unknown
    /// - Conflict if the transition is confirmed (irreversible)
    pub fn rollback(
        &self,
        actor: &str,
        transition_id: &str,
        change_id: &str,
        reason: &str,
    ) -> WscResult<ShardTransition> {
        let current = self.require(transition_id)?;

        match current.status {
            TransitionStatus::RolledBack => return Ok(current),
            TransitionStatus::Confirmed => {
                return Err(WscError::conflict_with(
                    "Confirmed transitions cannot be rolled back.",
                    json!({ "transition_id": transition_id }),
                ));
            }
            TransitionStatus::Prepared | TransitionStatus::Committed => {}
        }

        self.escrow.rollback(
            &current.identity_id,
            &current.change_id_prepare,
            change_id,
            reason,
        )?;

        let now_ms = self.clock.now_ms();
        let rolled_back = self.transitions.update(transition_id, &mut |cur| {
            let mut next = cur.clone();
            next.status = TransitionStatus::RolledBack;
            next.failure_reason = Some(reason.to_string());
            next.updated_at_ms = now_ms;
            Ok(next)
        })?;

        self.audit.emit(AuditEvent::TransitionRolledBack {
            at_ms: now_ms,
            actor: actor.to_string(),
            transition_id: transition_id.to_string(),
            reason: reason.to_string(),
        });
        Ok(rolled_back)
    }

    fn require(&self, transition_id: &str) -> WscResult<ShardTransition> {
        self.transitions.get(transition_id).ok_or_else(|| {
            WscError::not_found_with(
                "Transition not found.",
                json!({ "transition_id": transition_id }),
            )
        })
    }

    fn invalid_state(phase: &str, current: &ShardTransition) -> WscError {
        WscError::conflict_with(
            format!(
                "Cannot {phase} transition in state: {}",
                current.status.as_str()
            ),
            json!({
                "transition_id": current.transition_id,
                "status": current.status.as_str(),
            }),
        )
    }
}
