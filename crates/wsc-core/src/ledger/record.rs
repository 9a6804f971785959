//! Asset ownership record types.

use serde::{Deserialize, Serialize};
use serde_json::Map;

/// Broad asset category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Fungible currency.
    Currency,
    /// Inventory item.
    Item,
    /// Vehicle or vessel.
    Vehicle,
    /// Owned property.
    Property,
    /// Entitlement-backed asset.
    Entitlement,
    /// Reputation score.
    Reputation,
    /// Anything else.
    Other,
}

/// Where an asset is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetScope {
    /// Usable in every world.
    Global,
    /// Bound to one world.
    WorldLocal,
    /// Bound to one shard.
    ShardLocal,
}

/// Ledger status of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// Usable by its owner.
    Active,
    /// Locked by gameplay systems.
    Locked,
    /// Held in custodial escrow during a transition.
    Escrow,
    /// Used up.
    Consumed,
    /// Destroyed.
    Destroyed,
    /// Administratively frozen.
    Suspended,
}

impl AssetStatus {
    /// Returns the string representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Locked => "locked",
            Self::Escrow => "escrow",
            Self::Consumed => "consumed",
            Self::Destroyed => "destroyed",
            Self::Suspended => "suspended",
        }
    }
}

/// Kind of owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerType {
    /// A player identity.
    Player,
    /// A system account.
    System,
    /// A world.
    World,
    /// A guild.
    Guild,
}

/// Owning-entity reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetOwner {
    /// Kind of owner.
    pub owner_type: OwnerType,
    /// Owner identifier.
    pub owner_id: String,
}

/// Mutable gameplay state of an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetState {
    /// Ledger status.
    pub status: AssetStatus,
    /// Stack size, if stackable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
    /// Why the asset is in its current status, when noteworthy (set on
    /// rollback).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<String>,
    /// Free-form gameplay attributes.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, serde_json::Value>,
}

/// How an asset came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginType {
    /// Minted by the platform.
    Mint,
    /// Gameplay reward.
    Reward,
    /// Purchased.
    Purchase,
    /// World drop.
    Drop,
    /// Administrative grant.
    Grant,
    /// Migrated from another system.
    Migration,
}

/// Provenance of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetOrigin {
    /// How the asset was created.
    pub origin_type: OriginType,
    /// Reference to the originating event, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_ref: Option<String>,
}

/// Creation and update timestamps plus provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLifecycle {
    /// Creation time, unix epoch milliseconds.
    pub created_at_ms: u64,
    /// Last update, unix epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_ms: Option<u64>,
    /// Provenance.
    pub origin: AssetOrigin,
}

/// Transfer constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPolicy {
    /// Whether the asset may change hands or shards at all.
    pub transferable: bool,
    /// Whether transfers must pass through escrow.
    #[serde(default)]
    pub requires_escrow: bool,
}

/// A per-asset ledger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Asset identifier (`aid_` prefix).
    pub asset_id: String,
    /// Broad category.
    pub asset_class: AssetClass,
    /// Narrow type tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    /// Usability scope.
    pub scope: AssetScope,
    /// Owning world, for world-scoped assets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world_ref: Option<String>,
    /// Owning shard, for shard-scoped assets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_ref: Option<String>,
    /// Owning entity.
    pub owner: AssetOwner,
    /// Mutable gameplay state.
    pub state: AssetState,
    /// Timestamps and provenance.
    pub lifecycle: AssetLifecycle,
    /// Transfer constraints.
    pub transfer_policy: TransferPolicy,
    /// Monotonically increasing version counter; starts at 1.
    pub version: u64,
    /// Idempotency token of the last applied mutation.
    pub last_change_id: String,
    /// When the last mutation was applied, unix epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_changed_at_ms: Option<u64>,
}

impl AssetRecord {
    /// Builds a minimal active, transferable item owned by `owner_id`, for
    /// seeding ledgers in tests and fixtures.
    #[must_use]
    pub fn seeded(asset_id: &str, owner_id: &str, at_ms: u64) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            asset_class: AssetClass::Item,
            asset_type: None,
            scope: AssetScope::Global,
            world_ref: None,
            shard_ref: None,
            owner: AssetOwner {
                owner_type: OwnerType::Player,
                owner_id: owner_id.to_string(),
            },
            state: AssetState {
                status: AssetStatus::Active,
                quantity: Some(1),
                state_reason: None,
                attributes: Map::new(),
            },
            lifecycle: AssetLifecycle {
                created_at_ms: at_ms,
                updated_at_ms: None,
                origin: AssetOrigin {
                    origin_type: OriginType::Grant,
                    origin_ref: Some("seed".to_string()),
                },
            },
            transfer_policy: TransferPolicy {
                transferable: true,
                requires_escrow: true,
            },
            version: 1,
            last_change_id: "seed".to_string(),
            last_changed_at_ms: None,
        }
    }
}
