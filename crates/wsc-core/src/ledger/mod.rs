//! Per-asset ledger with atomic, idempotent mutation.
//!
//! The ledger is the lowest layer of the coordination kernel. Every write
//! goes through [`AssetLedger::mutate`], gated on a caller-supplied change
//! id: a mutation carrying the asset's last applied change id is a no-op
//! that returns the current record without invoking the transform. This is
//! the mutation-level half of the kernel's two idempotency layers; it makes
//! a retried escrow hold or release safe even when a higher layer invokes it
//! twice.
//!
//! # Invariants
//!
//! - The version counter only increases, by exactly one per applied
//!   mutation.
//! - A failed transform leaves the record untouched.

mod record;
mod store;

#[cfg(test)]
mod tests;

pub use record::{
    AssetClass, AssetLifecycle, AssetOrigin, AssetOwner, AssetRecord, AssetScope, AssetState,
    AssetStatus, OriginType, OwnerType, TransferPolicy,
};
pub use store::{AssetLedger, AssetTransform, InMemoryAssetLedger};
