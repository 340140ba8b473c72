//! # Runtime events emitted by workers and the coordinator.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Item events**: one per produced or consumed item, published inside the critical section
//! - **Milestones**: coordinator progress through the shutdown protocol
//!
//! The [`Event`] struct carries additional metadata such as the worker index,
//! a count, and a human-readable reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Item events are published while the mutex signal is held, so their `seq`
//! order is the order in which critical sections ran.
//!
//! ## Example
//! ```rust
//! use semvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ItemConsumed)
//!     .with_worker(3)
//!     .with_count(7);
//!
//! assert_eq!(ev.kind, EventKind::ItemConsumed);
//! assert_eq!(ev.worker, Some(3));
//! assert_eq!(ev.count, Some(7));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::Role;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Item events ===
    /// A producer filled one slot.
    ///
    /// Sets:
    /// - `worker`: producer index
    /// - `count`: items this producer has made so far
    ItemProduced,

    /// A consumer took one item.
    ///
    /// Sets:
    /// - `worker`: consumer index
    /// - `count`: items this consumer has taken so far
    ItemConsumed,

    // === Milestones ===
    /// Every consumer reached its quota and was joined.
    ConsumersDone,

    /// Stop flag set and empty slots force-released for producers.
    ///
    /// Sets:
    /// - `count`: number of released slots (equals the producer count)
    ProducersReleased,

    /// Every producer observed the stop flag and was joined.
    AllDone,

    /// The buffer signals were dropped.
    SignalsReleased,

    // === Warnings ===
    /// The configuration can never finish; the run continues anyway.
    ///
    /// Sets:
    /// - `reason`: why the run cannot finish
    DeadlockRisk,
}

impl EventKind {
    /// Worker role for item events, `None` for coordinator events.
    pub fn role(&self) -> Option<Role> {
        match self {
            EventKind::ItemProduced => Some(Role::Producer),
            EventKind::ItemConsumed => Some(Role::Consumer),
            _ => None,
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Index of the worker that emitted the event.
    pub worker: Option<usize>,
    /// Kind-specific counter (items so far, slots released).
    pub count: Option<u64>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches the emitting worker's index.
    #[inline]
    pub fn with_worker(mut self, index: usize) -> Self {
        self.worker = Some(index);
        self
    }

    /// Attaches a counter value.
    #[inline]
    pub fn with_count(mut self, n: u64) -> Self {
        self.count = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn is_item(&self) -> bool {
        self.kind.role().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::ConsumersDone);
        let b = Event::new(EventKind::AllDone);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_item_events_carry_role() {
        assert_eq!(EventKind::ItemProduced.role(), Some(Role::Producer));
        assert_eq!(EventKind::ItemConsumed.role(), Some(Role::Consumer));
        assert_eq!(EventKind::SignalsReleased.role(), None);
        assert!(Event::new(EventKind::ItemProduced).is_item());
        assert!(!Event::new(EventKind::DeadlockRisk).is_item());
    }

    #[test]
    fn test_builders_fill_fields() {
        let ev = Event::new(EventKind::DeadlockRisk).with_reason("no producers");
        assert_eq!(ev.reason.as_deref(), Some("no producers"));
        assert_eq!(ev.worker, None);
        assert_eq!(ev.count, None);
    }
}
