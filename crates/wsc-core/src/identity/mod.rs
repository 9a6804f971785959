//! Player identity records and storage.
//!
//! Identity is a collaborator of the coordination kernel, not part of it:
//! controllers consult the store only to check that a player exists and is
//! active before escrowing that player's assets. Mutation goes through the
//! same change-id gate as the asset ledger.

mod store;
mod types;

#[cfg(test)]
mod tests;

pub use store::{IdentityStore, IdentityTransform, InMemoryIdentityStore};
pub use types::{
    AuthBlock, AuthProvider, Entitlement, IdentityAudit, IdentityProfile, IdentityStatus,
    PlayerIdentity,
};
