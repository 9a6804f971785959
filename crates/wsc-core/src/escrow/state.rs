//! Escrow record types.

use serde::{Deserialize, Serialize};

/// Settlement status of an escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    /// Custody is active.
    Held,
    /// Settled: the transition confirmed and custody ended.
    Released,
    /// Settled: the transition failed and custody was undone.
    RolledBack,
}

impl EscrowStatus {
    /// Returns the string representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Held => "held",
            Self::Released => "released",
            Self::RolledBack => "rolled_back",
        }
    }

    /// Returns `true` once the escrow has settled either way.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Held)
    }
}

/// A custodial hold on a single asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// Escrow identifier (`tx_` prefix).
    pub escrow_id: String,
    /// The asset in custody.
    pub asset_id: String,
    /// The asset's owner at hold time.
    pub owner_id: String,
    /// Settlement status. Transitions out of `Held` exactly once.
    pub status: EscrowStatus,
    /// Hold time, unix epoch milliseconds.
    pub created_at_ms: u64,
    /// Settlement time, unix epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at_ms: Option<u64>,
}

/// A set of escrows acquired together under one lock change id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EscrowGroup {
    /// Owner the group was locked for.
    pub owner_id: String,
    /// The asset set, in lock order.
    pub asset_ids: Vec<String>,
    /// The escrow acquired for each asset, in lock order.
    pub escrow_ids: Vec<String>,
}
