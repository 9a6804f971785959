//! Cross-cutting lifecycle hooks.

use super::types::{ExecuteInput, ExecuteResult};
use crate::controller::TransitionKind;
use crate::error::{WscError, WscResult};

/// Observability hooks around orchestrator execution.
///
/// All methods default to no-ops. Only [`preflight`](Self::preflight) may
/// influence control flow, by failing before any side effect; the remaining
/// callbacks observe and must not assume they can alter the outcome.
pub trait TransitionHooks: Send + Sync {
    /// Guard invoked before any side effect. Failing vetoes the request.
    ///
    /// # Errors
    ///
    /// Any error aborts the request and propagates to the caller.
    fn preflight(&self, _input: &ExecuteInput) -> WscResult<()> {
        Ok(())
    }

    /// Invoked when execution starts, before `preflight`.
    fn on_start(&self, _input: &ExecuteInput) {}

    /// Invoked after a successful action.
    fn on_success(&self, _result: &ExecuteResult) {}

    /// Invoked after a failed action.
    fn on_failure(&self, _err: &WscError, _input: &ExecuteInput) {}

    /// Invoked when `begin` is served from the idempotency store.
    fn on_idempotent_replay(
        &self,
        _kind: TransitionKind,
        _request_id: &str,
        _transition_id: &str,
    ) {
    }
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl TransitionHooks for NoopHooks {}
