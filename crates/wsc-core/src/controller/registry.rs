//! Controller registration and routing.

use std::collections::HashMap;

use serde_json::json;

use super::types::{TransitionKind, TransitionRequest};
use super::TransitionController;
use crate::error::{WscError, WscResult};

/// Routes transition requests to the controller registered for their kind.
///
/// Registration is explicit: no kind is served until a controller is
/// registered for it, and a kind can only be registered once.
#[derive(Default)]
pub struct ControllerRegistry {
    controllers: HashMap<TransitionKind, Box<dyn TransitionController>>,
}

impl ControllerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller for its kind.
    ///
    /// # Errors
    ///
    /// Returns a Validation error if the kind is already registered.
    pub fn register(&mut self, controller: Box<dyn TransitionController>) -> WscResult<()> {
        let kind = controller.kind();
        if self.controllers.contains_key(&kind) {
            return Err(WscError::validation_with(
                format!("Controller already registered for kind: {}", kind.as_str()),
                json!({ "kind": kind.as_str() }),
            ));
        }
        self.controllers.insert(kind, controller);
        Ok(())
    }

    /// Returns the controller for `kind`.
    ///
    /// # Errors
    ///
    /// Returns a Validation error if no controller is registered.
    pub fn get(&self, kind: TransitionKind) -> WscResult<&dyn TransitionController> {
        self.controllers
            .get(&kind)
            .map(|controller| controller.as_ref())
            .ok_or_else(|| {
                WscError::validation_with(
                    format!("No controller registered for kind: {}", kind.as_str()),
                    json!({ "kind": kind.as_str() }),
                )
            })
    }

    /// The registered kinds, in no particular order.
    #[must_use]
    pub fn kinds(&self) -> Vec<TransitionKind> {
        self.controllers.keys().copied().collect()
    }

    /// Validates a request using its routed controller.
    ///
    /// # Errors
    ///
    /// Routing and shape failures surface as Validation errors.
    pub fn validate(&self, request: &TransitionRequest) -> WscResult<()> {
        self.get(request.kind)?.validate(request)
    }
}
