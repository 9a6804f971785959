//! Idempotency store contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::controller::TransitionKind;
use crate::error::{WscError, WscResult};

/// Minimum accepted `request_id` length.
pub const MIN_REQUEST_ID_LEN: usize = 6;

/// Minimum accepted TTL.
pub const MIN_TTL_MS: u64 = 1_000;

/// Default binding TTL: 10 minutes.
pub const DEFAULT_TTL_MS: u64 = 10 * 60 * 1_000;

/// A request-to-transition binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    /// Transition kind the request targeted.
    pub kind: TransitionKind,
    /// Client-supplied request id.
    pub request_id: String,
    /// The transition this request produced.
    pub transition_id: String,
    /// First bind time, unix epoch milliseconds. Preserved across same-value
    /// re-puts.
    pub created_at_ms: u64,
    /// Expiry, unix epoch milliseconds.
    pub expires_at_ms: u64,
    /// Number of replay hits served from this record.
    pub hits: u64,
}

impl IdempotencyRecord {
    /// Returns `true` once the record has logically expired.
    #[must_use]
    pub const fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Counters exposed for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyStats {
    /// Number of physically stored records, expired ones included.
    pub size: usize,
    /// Reads that returned a live binding.
    pub hits: u64,
    /// Reads that found nothing usable.
    pub misses: u64,
    /// Records physically removed by sweeps.
    pub evictions: u64,
}

/// Authoritative store for API-level idempotency.
///
/// A `(kind, request_id)` pair is bound to exactly one transition id for its
/// lifetime; binding it to a different transition id is a conflict, never a
/// silent overwrite.
pub trait RequestIdempotencyStore: Send + Sync {
    /// Returns the bound transition id, counting a hit or a miss. Expired
    /// records read as a miss.
    fn get(&self, kind: TransitionKind, request_id: &str, now_ms: u64) -> Option<String>;

    /// Binds `request_id` to `transition_id` for `ttl_ms`, or refreshes an
    /// existing same-value binding (preserving its creation time and hit
    /// count).
    ///
    /// # Errors
    ///
    /// - Validation if `request_id` is shorter than [`MIN_REQUEST_ID_LEN`]
    ///   or `ttl_ms` is below [`MIN_TTL_MS`]
    /// - Conflict if the pair is live-bound to a different transition id
    fn put(
        &self,
        kind: TransitionKind,
        request_id: &str,
        transition_id: &str,
        ttl_ms: u64,
        now_ms: u64,
    ) -> WscResult<()>;

    /// Returns the raw record without touching the hit/miss counters.
    /// Expired-but-unswept entries read as absent.
    fn peek(
        &self,
        kind: TransitionKind,
        request_id: &str,
        now_ms: u64,
    ) -> Option<IdempotencyRecord>;

    /// Removes up to `max_to_remove` expired records and returns how many
    /// were removed.
    fn sweep(&self, now_ms: u64, max_to_remove: usize) -> usize;

    /// Returns current counters.
    fn stats(&self) -> IdempotencyStats;
}

#[derive(Default)]
struct StoreInner {
    records: HashMap<(TransitionKind, String), IdempotencyRecord>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Reference in-memory idempotency store.
///
/// Production deployments would replace this with a shared store (Redis,
/// Dynamo, Spanner) satisfying the same contract.
#[derive(Default)]
pub struct InMemoryRequestIdempotencyStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryRequestIdempotencyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestIdempotencyStore for InMemoryRequestIdempotencyStore {
    fn get(&self, kind: TransitionKind, request_id: &str, now_ms: u64) -> Option<String> {
        let Ok(mut inner) = self.inner.lock() else {
            return None;
        };
        let key = (kind, request_id.to_string());
        let live = match inner.records.get_mut(&key) {
            Some(record) if !record.is_expired(now_ms) => {
                record.hits += 1;
                Some(record.transition_id.clone())
            }
            _ => None,
        };
        match live {
            Some(transition_id) => {
                inner.hits += 1;
                Some(transition_id)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    fn put(
        &self,
        kind: TransitionKind,
        request_id: &str,
        transition_id: &str,
        ttl_ms: u64,
        now_ms: u64,
    ) -> WscResult<()> {
        if request_id.len() < MIN_REQUEST_ID_LEN {
            return Err(WscError::validation_with(
                format!("request_id must be at least {MIN_REQUEST_ID_LEN} characters."),
                json!({ "kind": kind.as_str(), "request_id": request_id }),
            ));
        }
        if ttl_ms < MIN_TTL_MS {
            return Err(WscError::validation_with(
                format!("ttl_ms must be at least {MIN_TTL_MS}."),
                json!({ "kind": kind.as_str(), "ttl_ms": ttl_ms }),
            ));
        }

        let mut inner = self
            .inner
            .lock()
            .map_err(|_| WscError::transition("Idempotency store poisoned."))?;
        let key = (kind, request_id.to_string());

        let live_binding = inner
            .records
            .get(&key)
            .filter(|existing| !existing.is_expired(now_ms))
            .map(|existing| existing.transition_id.clone());

        match live_binding {
            Some(bound) if bound != transition_id => Err(WscError::conflict_with(
                "request_id already bound to a different transition_id.",
                json!({
                    "kind": kind.as_str(),
                    "request_id": request_id,
                    "transition_id": bound,
                }),
            )),
            Some(_) => {
                // Same-value re-put: refresh expiry, keep creation time and
                // hit count.
                if let Some(existing) = inner.records.get_mut(&key) {
                    existing.expires_at_ms = now_ms + ttl_ms;
                }
                Ok(())
            }
            None => {
                inner.records.insert(
                    key,
                    IdempotencyRecord {
                        kind,
                        request_id: request_id.to_string(),
                        transition_id: transition_id.to_string(),
                        created_at_ms: now_ms,
                        expires_at_ms: now_ms + ttl_ms,
                        hits: 0,
                    },
                );
                Ok(())
            }
        }
    }

    fn peek(
        &self,
        kind: TransitionKind,
        request_id: &str,
        now_ms: u64,
    ) -> Option<IdempotencyRecord> {
        self.inner.lock().ok().and_then(|inner| {
            inner
                .records
                .get(&(kind, request_id.to_string()))
                .filter(|r| !r.is_expired(now_ms))
                .cloned()
        })
    }

    fn sweep(&self, now_ms: u64, max_to_remove: usize) -> usize {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        let expired: Vec<(TransitionKind, String)> = inner
            .records
            .iter()
            .filter(|(_, r)| r.is_expired(now_ms))
            .take(max_to_remove)
            .map(|(k, _)| k.clone())
            .collect();
        let removed = expired.len();
        for key in expired {
            inner.records.remove(&key);
        }
        inner.evictions += removed as u64;
        if removed > 0 {
            debug!(target: "wsc::idempotency", removed, "swept expired request bindings");
        }
        removed
    }

    fn stats(&self) -> IdempotencyStats {
        self.inner
            .lock()
            .map(|inner| IdempotencyStats {
                size: inner.records.len(),
                hits: inner.hits,
                misses: inner.misses,
                evictions: inner.evictions,
            })
            .unwrap_or_default()
    }
}
