//! Shard transition record types.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a shard transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStatus {
    /// Assets escrowed, transition record created.
    Prepared,
    /// Destination accepted the transition; still reversible.
    Committed,
    /// Destination is authoritative; escrow released. Terminal.
    Confirmed,
    /// Transition failed; escrow rolled back to source. Terminal.
    RolledBack,
}

impl TransitionStatus {
    /// Returns the string representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prepared => "prepared",
            Self::Committed => "committed",
            Self::Confirmed => "confirmed",
            Self::RolledBack => "rolled_back",
        }
    }

    /// Returns `true` for the two terminal states.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::RolledBack)
    }
}

/// A player's move between two shards, tracked through the saga.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTransition {
    /// Transition identifier (`tx_` prefix).
    pub transition_id: String,
    /// The moving identity.
    pub identity_id: String,
    /// Source shard.
    pub from_shard: String,
    /// Destination shard.
    pub to_shard: String,
    /// Assets protected during the transfer, in lock order.
    pub protected_assets: Vec<String>,
    /// Lifecycle status.
    pub status: TransitionStatus,
    /// Change id recorded by `prepare`; also the escrow group key.
    pub change_id_prepare: String,
    /// Change id recorded by `commit`, once committed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_id_commit: Option<String>,
    /// Change id recorded by `confirm`, once confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_id_confirm: Option<String>,
    /// Why the transition rolled back, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Creation time, unix epoch milliseconds.
    pub created_at_ms: u64,
    /// Last update, unix epoch milliseconds.
    pub updated_at_ms: u64,
}

impl ShardTransition {
    /// Returns `true` if `change_id` was recorded by any completed phase.
    #[must_use]
    pub fn has_change_id(&self, change_id: &str) -> bool {
        self.change_id_prepare == change_id
            || self.change_id_commit.as_deref() == Some(change_id)
            || self.change_id_confirm.as_deref() == Some(change_id)
    }
}
