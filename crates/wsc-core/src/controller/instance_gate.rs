//! Instance gate entry policy.

use super::context::TransitionContext;
use super::types::{TransitionKind, TransitionOutcome, TransitionRequest};
use super::TransitionController;
use crate::error::{WscError, WscResult};

/// Entry through a gate into an instanced shard.
///
/// Instances are short-lived, so the entry commits immediately: the player
/// is inside the instance as soon as `begin` returns. Reintegration
/// (confirm) or a failed hydration (rollback) follow instance completion,
/// outside this controller.
pub struct InstanceGateController {
    ctx: TransitionContext,
}

impl InstanceGateController {
    /// Creates the controller.
    #[must_use]
    pub fn new(ctx: TransitionContext) -> Self {
        Self { ctx }
    }
}

impl TransitionController for InstanceGateController {
    fn kind(&self) -> TransitionKind {
        TransitionKind::InstanceGate
    }

    fn validate(&self, request: &TransitionRequest) -> WscResult<()> {
        if request.to_shard.as_deref().unwrap_or("").is_empty() {
            return Err(WscError::validation(
                "Instance gate requires destination instance shard.",
            ));
        }
        Ok(())
    }

    fn execute(
        &self,
        request: &TransitionRequest,
        change_id: &str,
    ) -> WscResult<TransitionOutcome> {
        self.ctx.require_active_identity(&request.identity_id)?;

        let to_shard = request
            .to_shard
            .as_deref()
            .ok_or_else(|| WscError::validation("Instance gate requires destination instance shard."))?;

        let transition = self.ctx.fsm.prepare(
            &self.ctx.actor,
            &request.identity_id,
            &request.from_shard,
            to_shard,
            &request.protected_assets,
            change_id,
        )?;

        // Instances are short-lived: commit on entry.
        self.ctx.fsm.commit(
            &self.ctx.actor,
            &transition.transition_id,
            &format!("{change_id}:commit"),
        )?;

        Ok(TransitionOutcome {
            success: true,
            transition_id: Some(transition.transition_id),
            flags: vec!["instance_entered".to_string()],
            ..TransitionOutcome::default()
        })
    }
}
