//! Transition request and outcome types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The supported transition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Entering (or leaving) an instanced area through a gate.
    InstanceGate,
    /// Placement into a matchmade session.
    MatchmakingQueue,
    /// Boarding a vehicle or vessel that crosses shards.
    VehicleVessel,
    /// Scheduled terminal travel between world regions.
    AirportTerminal,
}

impl TransitionKind {
    /// Returns the string representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InstanceGate => "instance_gate",
            Self::MatchmakingQueue => "matchmaking_queue",
            Self::VehicleVessel => "vehicle_vessel",
            Self::AirportTerminal => "airport_terminal",
        }
    }
}

/// A request to begin a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    /// Which entry policy to apply.
    pub kind: TransitionKind,
    /// The moving identity.
    pub identity_id: String,
    /// Source shard.
    pub from_shard: String,
    /// Destination shard; some kinds derive a default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_shard: Option<String>,
    /// Assets that must be protected during the transfer.
    pub protected_assets: Vec<String>,
    /// Kind-specific fields (match id, vehicle id, gate id, …).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl TransitionRequest {
    /// Returns the metadata string under `key`, if present and non-empty.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// The result of a controller's entry phases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    /// Whether the entry succeeded.
    pub success: bool,
    /// The transition driving this outcome. Required by the orchestrator
    /// for request binding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_id: Option<String>,
    /// Assets applied at the destination.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_assets: Vec<String>,
    /// Assets consumed by the entry (gate keys, tickets).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumed_assets: Vec<String>,
    /// Net currency movement, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_delta: Option<i64>,
    /// Kind-specific outcome flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    /// Why the entry failed, when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}
