//! Matchmaking placement entry policy.

use super::context::TransitionContext;
use super::types::{TransitionKind, TransitionOutcome, TransitionRequest};
use super::TransitionController;
use crate::error::{WscError, WscResult};

/// Destination shard used when a placement does not name one.
const DEFAULT_MATCH_SHARD: &str = "sid_match";

/// Placement into a matchmade session.
///
/// Matches are provisioned before placement, so the entry commits
/// immediately. The match identifier ties the transition to the
/// matchmaker's session record.
pub struct MatchmakingController {
    ctx: TransitionContext,
}

impl MatchmakingController {
    /// Creates the controller.
    #[must_use]
    pub fn new(ctx: TransitionContext) -> Self {
        Self { ctx }
    }
}

impl TransitionController for MatchmakingController {
    fn kind(&self) -> TransitionKind {
        TransitionKind::MatchmakingQueue
    }

    fn validate(&self, request: &TransitionRequest) -> WscResult<()> {
        if request.metadata_str("match_id").is_none() {
            return Err(WscError::validation(
                "match_id required for matchmaking transition.",
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

        let to_shard = request.to_shard.as_deref().unwrap_or(DEFAULT_MATCH_SHARD);

        let transition = self.ctx.fsm.prepare(
            &self.ctx.actor,
            &request.identity_id,
            &request.from_shard,
            to_shard,
            &request.protected_assets,
            change_id,
        )?;

        self.ctx.fsm.commit(
            &self.ctx.actor,
            &transition.transition_id,
            &format!("{change_id}:commit"),
        )?;

        Ok(TransitionOutcome {
            success: true,
            transition_id: Some(transition.transition_id),
            flags: vec!["match_started".to_string()],
            ..TransitionOutcome::default()
        })
    }
}
