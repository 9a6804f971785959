//! Vehicle and vessel boarding entry policy.

use super::context::TransitionContext;
use super::types::{TransitionKind, TransitionOutcome, TransitionRequest};
use super::TransitionController;
use crate::error::{WscError, WscResult};

/// Boarding a vehicle or vessel that crosses shards.
///
/// Departure commits immediately; the player is in transit once aboard.
/// Arrival at the destination confirms the transition, a scuttled voyage
/// rolls it back.
pub struct VehicleVesselController {
    ctx: TransitionContext,
}

impl VehicleVesselController {
    /// Creates the controller.
    #[must_use]
    pub fn new(ctx: TransitionContext) -> Self {
        Self { ctx }
    }
}

impl TransitionController for VehicleVesselController {
    fn kind(&self) -> TransitionKind {
        TransitionKind::VehicleVessel
    }

    fn validate(&self, request: &TransitionRequest) -> WscResult<()> {
        if request.to_shard.as_deref().unwrap_or("").is_empty() {
            return Err(WscError::validation(
                "Vehicle transition requires destination shard.",
            ));
        }
        if request.metadata_str("vehicle_id").is_none() {
            return Err(WscError::validation(
                "vehicle_id required for vehicle transition.",
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
            .ok_or_else(|| WscError::validation("Vehicle transition requires destination shard."))?;

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
            &format!("{change_id}:depart"),
        )?;

        Ok(TransitionOutcome {
            success: true,
            transition_id: Some(transition.transition_id),
            flags: vec!["in_transit".to_string()],
            ..TransitionOutcome::default()
        })
    }
}
