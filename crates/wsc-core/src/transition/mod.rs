//! Shard transition lifecycle: record types, store, and the FSM.
//!
//! # Architecture
//!
//! ```text
//! prepare --> PREPARED --> commit --> COMMITTED --> confirm --> CONFIRMED
//!                |                       |
//!                +------- rollback ------+--------> ROLLED_BACK
//! ```
//!
//! `CONFIRMED` and `ROLLED_BACK` are terminal. A confirmed transition can
//! never be rolled back: the destination shard has already taken authority
//! over the player and their assets.
//!
//! The FSM is the exclusive owner of [`ShardTransition`] mutation. All
//! asset movement flows through the escrow service, every state change is
//! audited, and each phase is idempotent under its recorded change id.

mod fsm;
mod state;
mod store;

#[cfg(test)]
mod tests;

pub use fsm::ShardTransitionFsm;
pub use state::{ShardTransition, TransitionStatus};
pub use store::{InMemoryTransitionStore, TransitionStore, TransitionTransform};
