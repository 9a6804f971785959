//! Kind-specific transition entry policies.
//!
//! Every way a player can move between shards (walking through an instance
//! gate, accepting a matchmaking placement, boarding a vehicle, flying out
//! of a terminal) shares the same coordination kernel but has its own
//! "begin" policy: what shape the request must have and how far the FSM is
//! driven on entry. A [`TransitionController`] captures one such policy for
//! one [`TransitionKind`]; the [`ControllerRegistry`] routes requests to the
//! registered controller.
//!
//! Controllers never call `confirm` or `rollback`. Those actions follow the
//! external event (instance completion, arrival, flight landing) and stay
//! orchestrator/FSM-driven; adding a transition kind never modifies the FSM
//! or the orchestrator.

mod airport_terminal;
mod context;
mod instance_gate;
mod matchmaking;
mod registry;
mod types;
mod vehicle_vessel;


pub use airport_terminal::AirportTerminalController;
pub use context::TransitionContext;
pub use instance_gate::InstanceGateController;
pub use matchmaking::MatchmakingController;
pub use registry::ControllerRegistry;
pub use types::{TransitionKind, TransitionOutcome, TransitionRequest};
pub use vehicle_vessel::VehicleVesselController;

use crate::error::WscResult;

/// One transition kind's entry policy.
pub trait TransitionController: Send + Sync {
    /// The kind this controller serves.
    fn kind(&self) -> TransitionKind;

    /// Enforces kind-specific shape requirements on the request.
    ///
    /// # Errors
    ///
    /// Returns a Validation error describing the missing or malformed
    /// field.
    fn validate(&self, request: &TransitionRequest) -> WscResult<()>;

    /// Drives the FSM through this kind's entry phases.
    ///
    /// `change_id` is the caller's mutation token for the prepare phase;
    /// controllers derive any further phase tokens from it. The returned
    /// outcome always carries the transition id.
    ///
    /// # Errors
    ///
    /// Identity-boundary failures (NotFound/Security) and FSM failures
    /// propagate verbatim.
    fn execute(&self, request: &TransitionRequest, change_id: &str)
        -> WscResult<TransitionOutcome>;
}

/// Builds the registry with every built-in controller registered.
///
/// # Panics
///
/// Never panics: the built-in kinds are distinct, so registration cannot
/// conflict.
#[must_use]
pub fn default_registry(ctx: TransitionContext) -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();
    for controller in [
        Box::new(InstanceGateController::new(ctx.clone())) as Box<dyn TransitionController>,
        Box::new(MatchmakingController::new(ctx.clone())),
        Box::new(VehicleVesselController::new(ctx.clone())),
        Box::new(AirportTerminalController::new(ctx)),
    ] {
        // Distinct built-in kinds: registration cannot fail.
        let _ = registry.register(controller);
    }
    registry
}
