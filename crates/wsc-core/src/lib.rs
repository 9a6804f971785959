//! Shard transition coordination kernel.
//!
//! `wsc-core` coordinates the movement of a player's authority and protected
//! assets between isolated world partitions (shards), guaranteeing that an
//! asset is never simultaneously usable in two places and never permanently
//! lost when a destination shard fails to admit the player.
//!
//! # Architecture
//!
//! ```text
//! TransitionOrchestrator
//!     |-- RequestIdempotencyStore   (request -> transition binding, TTL)
//!     |-- ControllerRegistry        (kind-specific begin policies)
//!     |       v
//!     |   ShardTransitionFsm        (prepared -> committed -> confirmed | rolled_back)
//!     |       |-- TransitionStore
//!     |       |-- EscrowService     (at-most-one escrow per asset, group locks)
//!     |       |       v
//!     |       |   AssetLedger       (change-id-gated idempotent mutation)
//!     |       +-- AuditSink
//! ```
//!
//! # Key Concepts
//!
//! - **Escrow**: custodial hold on an asset while its transition is in
//!   flight; settled exactly once as released or rolled back
//! - **Change id**: caller-supplied idempotency token scoped to one ledger
//!   or escrow mutation, or one FSM phase
//! - **Request id**: caller-supplied idempotency token scoped to one `begin`
//!   invocation, independent of change ids
//! - **Saga**: the transition is a multi-step transaction with explicit
//!   compensating actions (rollback) instead of a single atomic commit
//!
//! The two idempotency layers are deliberately separate: the request layer
//! prevents re-running a controller, the mutation layer prevents
//! re-applying a ledger or escrow effect even when an FSM method is invoked
//! twice directly.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use wsc_core::audit::NullAuditSink;
//! use wsc_core::clock::SystemClock;
//! use wsc_core::controller::{default_registry, TransitionContext};
//! use wsc_core::escrow::EscrowService;
//! use wsc_core::identity::InMemoryIdentityStore;
//! use wsc_core::idempotency::InMemoryRequestIdempotencyStore;
//! use wsc_core::ledger::InMemoryAssetLedger;
//! use wsc_core::orchestrator::{
//!     NoopHooks, OrchestratorConfig, TransitionOrchestrator,
//! };
//! use wsc_core::transition::{InMemoryTransitionStore, ShardTransitionFsm};
//!
//! let clock = Arc::new(SystemClock);
//! let ledger = Arc::new(InMemoryAssetLedger::new(clock.clone()));
//! let identities = Arc::new(InMemoryIdentityStore::new(clock.clone()));
//! let escrow = Arc::new(EscrowService::new(ledger.clone(), clock.clone()));
//! let transitions = Arc::new(InMemoryTransitionStore::new());
//! let fsm = Arc::new(ShardTransitionFsm::new(
//!     transitions,
//!     escrow,
//!     Arc::new(NullAuditSink),
//!     clock.clone(),
//! ));
//!
//! let ctx = TransitionContext {
//!     fsm,
//!     identities,
//!     ledger,
//!     actor: "gateway".to_string(),
//! };
//! let orchestrator = TransitionOrchestrator::new(
//!     ctx.clone(),
//!     default_registry(ctx),
//!     Arc::new(InMemoryRequestIdempotencyStore::new()),
//!     Arc::new(NoopHooks),
//!     OrchestratorConfig::default(),
//!     clock,
//! );
//! # let _ = orchestrator;
//! ```

pub mod audit;
pub mod clock;
pub mod controller;
pub mod error;
pub mod escrow;
pub mod identity;
pub mod idempotency;
pub mod ids;
pub mod ledger;
pub mod orchestrator;
pub mod schema;
pub mod transition;

pub use error::{WscError, WscResult};
