//! Orchestrator request/response contract.

use serde::{Deserialize, Serialize};

use crate::controller::{TransitionKind, TransitionOutcome, TransitionRequest};
use crate::transition::ShardTransition;

/// The three orchestrator actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteAction {
    /// Begin a new transition (idempotent under `request_id`).
    Begin,
    /// Make the destination authoritative.
    Confirm,
    /// Restore the source shard's authority.
    Rollback,
}

/// Input to [`TransitionOrchestrator::execute`](super::TransitionOrchestrator::execute).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ExecuteInput {
    /// Begin a transition.
    Begin {
        /// Client-stable idempotency key for this request.
        request_id: String,
        /// Server mutation token for the prepare phase.
        change_id: String,
        /// The transition request.
        request: TransitionRequest,
        /// Override for the request binding TTL.
        #[serde(skip_serializing_if = "Option::is_none")]
        ttl_ms: Option<u64>,
    },
    /// Confirm an existing transition.
    Confirm {
        /// Kind tag, echoed into the result.
        kind: TransitionKind,
        /// The transition to confirm.
        transition_id: String,
        /// Mutation token for the confirm phase.
        change_id: String,
        /// Kind-specific outcome supplied by the caller, echoed through.
        #[serde(skip_serializing_if = "Option::is_none")]
        outcome: Option<TransitionOutcome>,
    },
    /// Roll back an existing transition.
    Rollback {
        /// Kind tag, echoed into the result.
        kind: TransitionKind,
        /// The transition to roll back.
        transition_id: String,
        /// Mutation token for the rollback phase.
        change_id: String,
        /// Why the transition is being abandoned.
        reason: String,
    },
}

impl ExecuteInput {
    /// Returns the action this input requests.
    #[must_use]
    pub const fn action(&self) -> ExecuteAction {
        match self {
            Self::Begin { .. } => ExecuteAction::Begin,
            Self::Confirm { .. } => ExecuteAction::Confirm,
            Self::Rollback { .. } => ExecuteAction::Rollback,
        }
    }

    /// Returns the transition kind this input targets.
    #[must_use]
    pub const fn kind(&self) -> TransitionKind {
        match self {
            Self::Begin { request, .. } => request.kind,
            Self::Confirm { kind, .. } | Self::Rollback { kind, .. } => *kind,
        }
    }
}

/// Result of an orchestrator action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResult {
    /// The action that ran.
    pub action: ExecuteAction,
    /// The kind it targeted.
    pub kind: TransitionKind,
    /// The transition record after the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<ShardTransition>,
    /// The action's outcome, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TransitionOutcome>,
}
