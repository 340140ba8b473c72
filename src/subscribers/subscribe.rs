//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the
//! runtime. Each subscriber is driven by a dedicated worker loop fed by a bounded
//! queue that is owned by the [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Every event reaches every subscriber, in publish order.
//! - Each subscriber **declares** its queue capacity via
//!   [`Subscribe::queue_capacity`]. The queue absorbs bursts; a subscriber that
//!   stays behind for longer slows the producer/consumer threads down.
//!
//! ## Example (skeleton)
//! ```rust
//! use semvisor::{Event, EventKind, Subscribe};
//!
//! struct Tally;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Tally {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ItemConsumed {
//!             // count it...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "tally" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for diagnostics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue.
    ///
    /// While the queue is full, delivery waits for room.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
