//! Custodial escrow for assets in flight.
//!
//! While a shard transition is in progress its protected assets are held in
//! escrow: the ledger status flips to `escrow`, an [`EscrowRecord`] is
//! created, and nothing else may touch the asset until the escrow settles as
//! released (transition confirmed) or rolled back (transition failed).
//!
//! # Architecture
//!
//! ```text
//! holdAsset --> EscrowRecord (HELD), ledger status active -> escrow
//!                  |
//!     releaseAsset +--> RELEASED, ledger escrow -> active
//!                  |
//!    rollbackAsset +--> ROLLED_BACK, ledger escrow -> active (+ reason)
//! ```
//!
//! # Key Concepts
//!
//! - **At-most-one**: one `HELD` escrow per asset, enforced by the
//!   asset-to-escrow index
//! - **Group**: the set of assets locked together under one change id; the
//!   unit the transition FSM settles on confirm/rollback
//! - **All-or-nothing**: a partially failed group lock rolls back every hold
//!   it acquired before surfacing the original error
//!
//! The group change id doubles as the lock phase's idempotency token:
//! re-locking the same asset set under the same change id returns the
//! existing escrows without re-escrowing anything.

mod service;
mod state;


pub use service::EscrowService;
pub use state::{EscrowRecord, EscrowStatus};
