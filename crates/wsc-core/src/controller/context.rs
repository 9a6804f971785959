//! Shared collaborator handle for controllers.

use std::sync::Arc;

use serde_json::json;

use crate::error::{WscError, WscResult};
use crate::identity::IdentityStore;
use crate::ledger::AssetLedger;
use crate::transition::ShardTransitionFsm;

/// Collaborators every controller needs.
#[derive(Clone)]
pub struct TransitionContext {
    /// The transition state machine.
    pub fsm: Arc<ShardTransitionFsm>,
    /// Identity boundary, consulted before escrow.
    pub identities: Arc<dyn IdentityStore>,
    /// Asset ledger boundary.
    pub ledger: Arc<dyn AssetLedger>,
    /// Acting principal recorded on audit events.
    pub actor: String,
}

impl TransitionContext {
    /// Verifies that the moving identity exists and is active.
    ///
    /// # Errors
    ///
    /// - NotFound if the identity is absent
    /// - Security if the identity is not active
    pub fn require_active_identity(&self, identity_id: &str) -> WscResult<()> {
        let identity = self.identities.get(identity_id).ok_or_else(|| {
            WscError::not_found_with(
                "Identity not found.",
                json!({ "identity_id": identity_id }),
            )
        })?;
        if !identity.is_active() {
            return Err(WscError::security_with(
                "Identity is not active.",
                json!({
                    "identity_id": identity_id,
                    "status": identity.status.as_str(),
                }),
            ));
        }
        Ok(())
    }
}
