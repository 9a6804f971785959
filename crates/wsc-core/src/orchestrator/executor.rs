//! Orchestrator implementation.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use super::hooks::TransitionHooks;
use super::types::{ExecuteAction, ExecuteInput, ExecuteResult};
use crate::clock::Clock;
use crate::controller::{
    ControllerRegistry, TransitionContext, TransitionKind, TransitionOutcome, TransitionRequest,
};
use crate::error::{WscError, WscResult};
use crate::idempotency::{RequestIdempotencyStore, DEFAULT_TTL_MS, MIN_REQUEST_ID_LEN};

/// Minimum accepted `change_id` length on `begin`.
pub const MIN_CHANGE_ID_LEN: usize = 6;

/// Opportunistic idempotency sweeping on the request path.
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    /// Upper bound on records removed per request.
    pub max_to_remove: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_to_remove: 5_000,
        }
    }
}

/// Orchestrator tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// TTL applied to request bindings when `begin` does not override it.
    pub default_ttl_ms: u64,
    /// When set, expired request bindings are swept before each request.
    pub sweep: Option<SweepConfig>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            sweep: None,
        }
    }
}

/// Composes idempotency lookup, controller dispatch, and FSM
/// confirm/rollback into one request/response contract.
pub struct TransitionOrchestrator {
    ctx: TransitionContext,
    registry: ControllerRegistry,
    idempotency: Arc<dyn RequestIdempotencyStore>,
    hooks: Arc<dyn TransitionHooks>,
    config: OrchestratorConfig,
    clock: Arc<dyn Clock>,
}

impl TransitionOrchestrator {
    /// Creates an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        ctx: TransitionContext,
        registry: ControllerRegistry,
        idempotency: Arc<dyn RequestIdempotencyStore>,
        hooks: Arc<dyn TransitionHooks>,
        config: OrchestratorConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ctx,
            registry,
            idempotency,
            hooks,
            config,
            clock,
        }
    }

    /// Executes one orchestrator action.
    ///
    /// # Errors
    ///
    /// Propagates every kernel error verbatim; see the action methods for
    /// the per-action taxonomy.
    pub fn execute(&self, input: ExecuteInput) -> WscResult<ExecuteResult> {
        self.hooks.on_start(&input);
        let result = self.execute_guarded(&input);
        match &result {
            Ok(res) => self.hooks.on_success(res),
            Err(err) => self.hooks.on_failure(err, &input),
        }
        result
    }

    fn execute_guarded(&self, input: &ExecuteInput) -> WscResult<ExecuteResult> {
        self.hooks.preflight(input)?;

        if let Some(sweep) = self.config.sweep {
            self.idempotency
                .sweep(self.clock.now_ms(), sweep.max_to_remove);
        }

        match input {
            ExecuteInput::Begin {
                request_id,
                change_id,
                request,
                ttl_ms,
            } => self.begin(request_id, change_id, request, *ttl_ms),
            ExecuteInput::Confirm {
                kind,
                transition_id,
                change_id,
                outcome,
            } => self.confirm(*kind, transition_id, change_id, outcome.clone()),
            ExecuteInput::Rollback {
                kind,
                transition_id,
                change_id,
                reason,
            } => self.rollback(*kind, transition_id, change_id, reason),
        }
    }

    /// Begins a transition, idempotently under `request_id`.
    fn begin(
        &self,
        request_id: &str,
        change_id: &str,
        request: &TransitionRequest,
        ttl_ms: Option<u64>,
    ) -> WscResult<ExecuteResult> {
        if request_id.is_empty() {
            return Err(WscError::validation("begin requires request_id."));
        }
        // The idempotency bind runs after the controller; weak ids must be
        // rejected before any side effect.
        if request_id.len() < MIN_REQUEST_ID_LEN {
            return Err(WscError::validation(format!(
                "begin requires a strong request_id (>= {MIN_REQUEST_ID_LEN} chars)."
            )));
        }
        if change_id.len() < MIN_CHANGE_ID_LEN {
            return Err(WscError::validation(format!(
                "begin requires a strong change_id (>= {MIN_CHANGE_ID_LEN} chars)."
            )));
        }

        let kind = request.kind;
        let now_ms = self.clock.now_ms();

        // API-level idempotency, checked before any controller runs.
        if let Some(transition_id) = self.idempotency.get(kind, request_id, now_ms) {
            let transition = self.ctx.fsm.store().get(&transition_id).ok_or_else(|| {
                WscError::transition_with(
                    "Idempotency store points to missing transition.",
                    json!({
                        "kind": kind.as_str(),
                        "request_id": request_id,
                        "transition_id": transition_id,
                    }),
                )
            })?;

            debug!(
                target: "wsc::orchestrator",
                kind = kind.as_str(),
                request_id,
                transition_id = %transition_id,
                "begin replayed from idempotency store"
            );
            self.hooks
                .on_idempotent_replay(kind, request_id, &transition_id);

            return Ok(ExecuteResult {
                action: ExecuteAction::Begin,
                kind,
                transition: Some(transition),
                outcome: Some(TransitionOutcome {
                    success: true,
                    transition_id: Some(transition_id),
                    flags: vec!["idempotent_replay".to_string()],
                    ..TransitionOutcome::default()
                }),
            });
        }

        self.registry.validate(request)?;
        let controller = self.registry.get(kind)?;
        let outcome = controller.execute(request, change_id)?;

        let transition_id = outcome.transition_id.clone().ok_or_else(|| {
            WscError::transition_with(
                "Controller did not return transition_id (required for request binding).",
                json!({ "kind": kind.as_str(), "request_id": request_id }),
            )
        })?;

        self.idempotency.put(
            kind,
            request_id,
            &transition_id,
            ttl_ms.unwrap_or(self.config.default_ttl_ms),
            now_ms,
        )?;

        let transition = self.ctx.fsm.store().get(&transition_id);
        Ok(ExecuteResult {
            action: ExecuteAction::Begin,
            kind,
            transition,
            outcome: Some(outcome),
        })
    }

    /// Confirms an existing transition.
    fn confirm(
        &self,
        kind: TransitionKind,
        transition_id: &str,
        change_id: &str,
        outcome: Option<TransitionOutcome>,
    ) -> WscResult<ExecuteResult> {
        self.require_transition(transition_id)?;
        let transition = self
            .ctx
            .fsm
            .confirm(&self.ctx.actor, transition_id, change_id)?;
        Ok(ExecuteResult {
            action: ExecuteAction::Confirm,
            kind,
            transition: Some(transition),
            outcome,
        })
    }

    /// Rolls back an existing transition.
    fn rollback(
        &self,
        kind: TransitionKind,
        transition_id: &str,
        change_id: &str,
        reason: &str,
    ) -> WscResult<ExecuteResult> {
        self.require_transition(transition_id)?;
        let transition =
            self.ctx
                .fsm
                .rollback(&self.ctx.actor, transition_id, change_id, reason)?;
        Ok(ExecuteResult {
            action: ExecuteAction::Rollback,
            kind,
            transition: Some(transition),
            outcome: Some(TransitionOutcome {
                success: false,
                failure_reason: Some(reason.to_string()),
                ..TransitionOutcome::default()
            }),
        })
    }

    fn require_transition(&self, transition_id: &str) -> WscResult<()> {
        if self.ctx.fsm.store().get(transition_id).is_none() {
            return Err(WscError::not_found_with(
                "Transition not found.",
                json!({ "transition_id": transition_id }),
            ));
        }
        Ok(())
    }
}
