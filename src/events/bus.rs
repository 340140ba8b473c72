//! # Event bus for runtime events.
//!
//! [`Bus`] carries events from many sources (worker threads and the coordinator)
//! over two paths:
//!
//! - a **sink**: an optional bounded [`tokio::sync::mpsc`] channel that receives
//!   every event, in publish order, with backpressure. The coordinator feeds its
//!   subscribers from it, so console output never loses a line;
//! - a **tap**: a [`tokio::sync::broadcast`] ring for extra receivers created
//!   with [`Bus::subscribe`]. Taps are lossy.
//!
//! ## Architecture
//! ```text
//! Publishers (many):
//!   Producer 0 ──┐                ┌─► sink (mpsc, lossless) ──► listener ──► SubscriberSet
//!   Producer N ──┼──────► Bus ────┤
//!   Consumer M ──┤                └─► tap (broadcast, lossy) ──► Bus::subscribe() receivers
//!   Coordinator ─┘
//! ```
//!
//! ## Rules
//! - **Blocking publish**: with a sink, `publish()` blocks while the sink is full.
//!   Workers publish from inside the critical section, so a slow subscriber
//!   slows the whole buffer down instead of losing events.
//! - **Sync only**: `publish()` must be called from a plain thread or a
//!   `spawn_blocking` task, never from async code.
//! - **Lag handling on taps**: slow tap receivers get `RecvError::Lagged(n)` and skip
//!   the `n` oldest items.
//! - **Close on drop**: the sink receiver and tap receivers see the end of the
//!   stream once every `Bus` clone is dropped.

use tokio::sync::{broadcast, mpsc};

use super::event::Event;

/// Event channel shared by every publisher of a run.
///
/// ### Properties
/// - **Lossless sink** (when built with [`Bus::with_sink`]).
/// - **Lossy taps** for any number of extra receivers.
/// - **Cloneable**: cheap to clone (internally holds `Arc`-backed senders).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    sink: Option<mpsc::Sender<Event>>,
}

impl Bus {
    /// Creates a bus without a sink. Events reach tap receivers only.
    ///
    /// `capacity` sizes the tap ring (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx, sink: None }
    }

    /// Creates a bus whose sink receives every published event.
    ///
    /// `capacity` (minimum 1) bounds both the sink and the tap ring. Once the
    /// returned receiver is dropped, the sink is skipped.
    pub fn with_sink(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        let (sink, rx) = mpsc::channel::<Event>(capacity);
        (
            Self {
                tx,
                sink: Some(sink),
            },
            rx,
        )
    }

    /// Publishes an event to the sink, then to all active taps.
    ///
    /// # Panics
    /// If the bus has a sink and this is called from within an async context.
    pub fn publish(&self, ev: Event) {
        if let Some(sink) = &self.sink {
            // Err only once the receiving side is gone.
            let _ = sink.blocking_send(ev.clone());
        }
        let _ = self.tx.send(ev);
    }

    /// Creates a tap receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use std::thread;

    #[test]
    fn test_publish_without_receivers_is_silent() {
        let bus = Bus::new(4);
        bus.publish(Event::new(EventKind::AllDone));
    }

    #[test]
    fn test_receiver_sees_events_in_order_then_closed() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::ConsumersDone));
        bus.publish(Event::new(EventKind::AllDone));
        drop(bus);

        assert_eq!(rx.try_recv().unwrap().kind, EventKind::ConsumersDone);
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::AllDone);
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Closed)
        ));
    }

    #[test]
    fn test_lagging_tap_skips_oldest() {
        let bus = Bus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..5 {
            bus.publish(Event::new(EventKind::ItemProduced));
        }
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(3))
        ));
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::ItemProduced);
    }

    #[test]
    fn test_sink_receives_everything_past_capacity() {
        let (bus, mut rx) = Bus::with_sink(2);
        let publisher = thread::spawn(move || {
            for i in 0..500 {
                bus.publish(Event::new(EventKind::ItemProduced).with_count(i));
            }
        });

        let mut counts = Vec::new();
        while let Some(ev) = rx.blocking_recv() {
            counts.push(ev.count.unwrap());
        }
        publisher.join().unwrap();

        assert_eq!(counts, (0..500).collect::<Vec<u64>>());
    }

    #[test]
    fn test_dropped_sink_does_not_block_publishers() {
        let (bus, rx) = Bus::with_sink(1);
        drop(rx);
        for _ in 0..10 {
            bus.publish(Event::new(EventKind::ItemConsumed));
        }
    }
}
