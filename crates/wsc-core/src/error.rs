//! Crate-wide error taxonomy.
//!
//! Every fallible operation in the kernel raises one of five error kinds:
//!
//! - **Validation**: malformed or missing caller input; never retried
//!   automatically
//! - **NotFound**: a referenced entity is absent
//! - **Conflict**: a state precondition was violated (invalid phase
//!   transition, duplicate binding, asset not escrowable)
//! - **Security**: ownership or authorization violation
//! - **Transition**: orchestration-level failure (controller contract
//!   violation, idempotency-store divergence)
//!
//! Lower layers raise the most specific kind; the FSM and orchestrator
//! propagate them verbatim so callers can distinguish "already done"
//! (absorbed as an idempotent no-op return) from "cannot be done" (raised).
//!
//! Each error carries a stable machine-readable [`code`](WscError::code) and
//! an optional structured details payload sufficient to reconstruct the
//! failing key (asset id, transition id, kind).

use serde_json::Value;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type WscResult<T> = Result<T, WscError>;

/// The kernel error taxonomy.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum WscError {
    /// Malformed or missing caller input.
    #[error("{message}")]
    Validation {
        /// Human-readable description of the failure.
        message: String,
        /// Structured payload identifying the offending input.
        details: Option<Value>,
    },

    /// A referenced entity does not exist.
    #[error("{message}")]
    NotFound {
        /// Human-readable description of the failure.
        message: String,
        /// Structured payload identifying the missing key.
        details: Option<Value>,
    },

    /// A state precondition was violated.
    #[error("{message}")]
    Conflict {
        /// Human-readable description of the failure.
        message: String,
        /// Structured payload identifying the conflicting state.
        details: Option<Value>,
    },

    /// Ownership or authorization violation.
    #[error("{message}")]
    Security {
        /// Human-readable description of the failure.
        message: String,
        /// Structured payload identifying the denied subject.
        details: Option<Value>,
    },

    /// Orchestration-level failure.
    #[error("{message}")]
    Transition {
        /// Human-readable description of the failure.
        message: String,
        /// Structured payload identifying the failing transition.
        details: Option<Value>,
    },
}

impl WscError {
    /// Creates a Validation error without details.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    /// Creates a Validation error with a structured details payload.
    pub fn validation_with(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Creates a NotFound error without details.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            details: None,
        }
    }

    /// Creates a NotFound error with a structured details payload.
    pub fn not_found_with(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Creates a Conflict error without details.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            details: None,
        }
    }

    /// Creates a Conflict error with a structured details payload.
    pub fn conflict_with(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Creates a Security error without details.
    pub fn security(message: impl Into<String>) -> Self {
        Self::Security {
            message: message.into(),
            details: None,
        }
    }

    /// Creates a Security error with a structured details payload.
    pub fn security_with(message: impl Into<String>, details: Value) -> Self {
        Self::Security {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Creates a Transition error without details.
    pub fn transition(message: impl Into<String>) -> Self {
        Self::Transition {
            message: message.into(),
            details: None,
        }
    }

    /// Creates a Transition error with a structured details payload.
    pub fn transition_with(message: impl Into<String>, details: Value) -> Self {
        Self::Transition {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Returns the stable machine-readable code for this error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::Security { .. } => "SECURITY_ERROR",
            Self::Transition { .. } => "TRANSITION_ERROR",
        }
    }

    /// Returns the structured details payload, if any.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        match self {
            Self::Validation { details, .. }
            | Self::NotFound { details, .. }
            | Self::Conflict { details, .. }
            | Self::Security { details, .. }
            | Self::Transition { details, .. } => details.as_ref(),
        }
    }

    /// Returns `true` if this is a Validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if this is a NotFound error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a Conflict error.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns `true` if this is a Security error.
    #[must_use]
    pub const fn is_security(&self) -> bool {
        matches!(self, Self::Security { .. })
    }

    /// Returns `true` if this is a Transition error.
    #[must_use]
    pub const fn is_transition(&self) -> bool {
        matches!(self, Self::Transition { .. })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(WscError::validation("x").code(), "VALIDATION_ERROR");
        assert_eq!(WscError::not_found("x").code(), "NOT_FOUND");
        assert_eq!(WscError::conflict("x").code(), "CONFLICT");
        assert_eq!(WscError::security("x").code(), "SECURITY_ERROR");
        assert_eq!(WscError::transition("x").code(), "TRANSITION_ERROR");
    }

    #[test]
    fn test_details_round_trip() {
        let err = WscError::conflict_with("asset escrowed", json!({"asset_id": "aid_1"}));
        assert_eq!(
            err.details().and_then(|d| d["asset_id"].as_str()),
            Some("aid_1")
        );
        assert!(WscError::conflict("bare").details().is_none());
    }

    #[test]
    fn test_display_is_message() {
        let err = WscError::validation("identity_id required");
        assert_eq!(err.to_string(), "identity_id required");
    }
}
