//! Request-level idempotency store.
//!
//! Maps a client-supplied `(kind, request_id)` pair to the transition it
//! produced. This is the API-level half of the kernel's two idempotency
//! layers: it stops a retried `begin` from re-running a controller at all,
//! while the change-id gate on the ledger stops a re-run mutation from
//! re-applying its effect. The two layers stay separate; collapsing them
//! would require threading a single external key through every internal
//! mutation.
//!
//! Records expire after a TTL. Expired entries are logically absent (reads
//! return a miss) even before [`sweep`](RequestIdempotencyStore::sweep)
//! physically removes them; sweep is bounded so it is safe to run
//! opportunistically on the hot path.

mod store;


pub use store::{
    IdempotencyRecord, IdempotencyStats, InMemoryRequestIdempotencyStore,
    RequestIdempotencyStore, DEFAULT_TTL_MS, MIN_REQUEST_ID_LEN, MIN_TTL_MS,
};
