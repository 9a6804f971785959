//! Airport terminal travel entry policy.

use super::context::TransitionContext;
use super::types::{TransitionKind, TransitionOutcome, TransitionRequest};
use super::TransitionController;
use crate::error::{WscError, WscResult};

/// Scheduled terminal travel between world regions.
///
/// Terminal travel is the one built-in kind that does not commit on entry:
/// `begin` only prepares, holding the assets in escrow while the player
/// waits at the terminal. Boarding commits, landing confirms, and a
/// cancelled departure rolls back, all driven by the travel system after
/// the fact.
pub struct AirportTerminalController {
    ctx: TransitionContext,
}

impl AirportTerminalController {
    /// Creates the controller.
    #[must_use]
    pub fn new(ctx: TransitionContext) -> Self {
        Self { ctx }
    }
}

impl TransitionController for AirportTerminalController {
    fn kind(&self) -> TransitionKind {
        TransitionKind::AirportTerminal
    }

    fn validate(&self, request: &TransitionRequest) -> WscResult<()> {
        if request.to_shard.as_deref().unwrap_or("").is_empty() {
            return Err(WscError::validation(
                "Terminal travel requires destination shard.",
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
            .ok_or_else(|| WscError::validation("Terminal travel requires destination shard."))?;

        let transition = self.ctx.fsm.prepare(
            &self.ctx.actor,
            &request.identity_id,
            &request.from_shard,
            to_shard,
            &request.protected_assets,
            change_id,
        )?;

        Ok(TransitionOutcome {
            success: true,
            transition_id: Some(transition.transition_id),
            flags: vec!["departure_scheduled".to_string()],
            ..TransitionOutcome::default()
        })
    }
}
