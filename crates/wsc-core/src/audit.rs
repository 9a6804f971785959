//! Audit event boundary.
//!
//! The kernel is a producer only: lifecycle owners emit tagged events into an
//! [`AuditSink`] and never read them back. Delivery is fire-and-forget: a
//! sink that fails must swallow its own failure, and a transition never fails
//! because its audit record could not be written.
//!
//! # Example
//!
//! ```rust
//! use wsc_core::audit::{AuditEvent, AuditSink, MemoryAuditSink};
//!
//! let sink = MemoryAuditSink::default();
//! sink.emit(AuditEvent::TransitionCommitted {
//!     at_ms: 1,
//!     actor: "gateway".into(),
//!     transition_id: "tx_01".into(),
//! });
//! assert_eq!(sink.events().len(), 1);
//! ```

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// A tagged audit event.
///
/// Serialized form carries a `type` discriminator matching the event names
/// on the wire (`transition.started`, `asset.escrowed`, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuditEvent {
    /// An identity record was created.
    #[serde(rename = "identity.created")]
    IdentityCreated {
        /// Emission time, unix epoch milliseconds.
        at_ms: u64,
        /// Acting principal.
        actor: String,
        /// The created identity.
        identity_id: String,
    },

    /// An identity record was mutated.
    #[serde(rename = "identity.mutated")]
    IdentityMutated {
        /// Emission time, unix epoch milliseconds.
        at_ms: u64,
        /// Acting principal.
        actor: String,
        /// The mutated identity.
        identity_id: String,
        /// Idempotency token of the applied mutation.
        change_id: String,
    },

    /// An asset entered escrow custody.
    #[serde(rename = "asset.escrowed")]
    AssetEscrowed {
        /// Emission time, unix epoch milliseconds.
        at_ms: u64,
        /// Acting principal.
        actor: String,
        /// The escrowed asset.
        asset_id: String,
        /// The custodial escrow record.
        escrow_id: String,
    },

    /// An asset left escrow custody.
    #[serde(rename = "asset.released")]
    AssetReleased {
        /// Emission time, unix epoch milliseconds.
        at_ms: u64,
        /// Acting principal.
        actor: String,
        /// The released asset.
        asset_id: String,
        /// The settled escrow record.
        escrow_id: String,
    },

    /// A shard transition was prepared.
    #[serde(rename = "transition.started")]
    TransitionStarted {
        /// Emission time, unix epoch milliseconds.
        at_ms: u64,
        /// Acting principal.
        actor: String,
        /// The new transition.
        transition_id: String,
        /// Source shard.
        from: String,
        /// Destination shard.
        to: String,
    },

    /// A shard transition was committed.
    #[serde(rename = "transition.committed")]
    TransitionCommitted {
        /// Emission time, unix epoch milliseconds.
        at_ms: u64,
        /// Acting principal.
        actor: String,
        /// The committed transition.
        transition_id: String,
    },

    /// A shard transition was confirmed; the destination is authoritative.
    #[serde(rename = "transition.confirmed")]
    TransitionConfirmed {
        /// Emission time, unix epoch milliseconds.
        at_ms: u64,
        /// Acting principal.
        actor: String,
        /// The confirmed transition.
        transition_id: String,
    },

    /// A shard transition was rolled back to the source shard.
    #[serde(rename = "transition.rolled_back")]
    TransitionRolledBack {
        /// Emission time, unix epoch milliseconds.
        at_ms: u64,
        /// Acting principal.
        actor: String,
        /// The rolled-back transition.
        transition_id: String,
        /// Why the transition failed.
        reason: String,
    },
}

impl AuditEvent {
    /// Returns the wire tag of this event.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::IdentityCreated { .. } => "identity.created",
            Self::IdentityMutated { .. } => "identity.mutated",
            Self::AssetEscrowed { .. } => "asset.escrowed",
            Self::AssetReleased { .. } => "asset.released",
            Self::TransitionStarted { .. } => "transition.started",
            Self::TransitionCommitted { .. } => "transition.committed",
            Self::TransitionConfirmed { .. } => "transition.confirmed",
            Self::TransitionRolledBack { .. } => "transition.rolled_back",
        }
    }
}

/// One-way audit sink.
pub trait AuditSink: Send + Sync {
    /// Emits an event. Must not fail; sinks handle delivery errors
    /// internally.
    fn emit(&self, event: AuditEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn emit(&self, _event: AuditEvent) {}
}

/// Sink that logs each event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: AuditEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => {
                tracing::info!(target: "wsc::audit", event = event.event_type(), %payload);
            }
            Err(err) => {
                tracing::warn!(target: "wsc::audit", event = event.event_type(), %err, "audit serialization failed");
            }
        }
    }
}

/// Sink that buffers events in memory.
///
/// Used by tests to assert on emission counts and ordering.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all emitted events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Returns how many events with the given wire tag were emitted.
    #[must_use]
    pub fn count_of(&self, event_type: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }

    /// Clears the buffer.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn emit(&self, event: AuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_matches_serde_tag() {
        let ev = AuditEvent::AssetEscrowed {
            at_ms: 5,
            actor: "a".into(),
            asset_id: "aid_x".into(),
            escrow_id: "tx_y".into(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"].as_str(), Some(ev.event_type()));
    }

    #[test]
    fn test_memory_sink_buffers_in_order() {
        let sink = MemoryAuditSink::new();
        sink.emit(AuditEvent::TransitionCommitted {
            at_ms: 1,
            actor: "a".into(),
            transition_id: "tx_1".into(),
        });
        sink.emit(AuditEvent::TransitionConfirmed {
            at_ms: 2,
            actor: "a".into(),
            transition_id: "tx_1".into(),
        });
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type(), "transition.committed");
        assert_eq!(events[1].event_type(), "transition.confirmed");
        assert_eq!(sink.count_of("transition.confirmed"), 1);
    }

    #[test]
    fn test_round_trip_serde() {
        let ev = AuditEvent::TransitionRolledBack {
            at_ms: 9,
            actor: "gateway".into(),
            transition_id: "tx_9".into(),
            reason: "destination_hydration_failed".into(),
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: AuditEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }
}
