//! # SubscriberSet: lossless fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`](crate::events::Event) to multiple
//! subscribers, each running on its own worker task behind a bounded queue.
//!
//! ## What it guarantees
//! - Every emitted event reaches every live subscriber: `emit(..).await` waits
//!   for room in a full queue instead of dropping.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and reported (isolation); the worker
//!   keeps going with the next event.
//! - `shutdown()` delivers everything already queued before returning.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers.
//! - A slow subscriber is not skipped: it holds back `emit`, and through it the
//!   bus publishers.
//!
//! ## Diagram
//! ```text
//!    emit(Event).await
//!        │                        (Arc-clone per subscriber)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_event()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_event()
//!        └────────────────► [queue SN] ─► worker SN ─► on_event()
//! ```
//!
//! Diagnostics go straight to stderr: the set sits downstream of the bus and
//! must not feed events back into it, or the bus would never close.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Event;

use super::Subscribe;

/// Per-subscriber channel with metadata
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) = AssertUnwindSafe(fut).catch_unwind().await {
                        eprintln!(
                            "[semvisor] subscriber '{}' panicked on {:?}: {}",
                            name,
                            ev.kind,
                            panic_message(&*panic_err)
                        );
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Hands one event to every subscriber, waiting while a queue is full.
    ///
    /// A subscriber whose worker has stopped is reported on stderr and skipped.
    pub async fn emit(&self, event: Event) {
        let ev = Arc::new(event);
        for channel in &self.channels {
            if channel.sender.send(Arc::clone(&ev)).await.is_err() {
                eprintln!(
                    "[semvisor] subscriber '{}' missed {:?}: worker stopped",
                    channel.name, ev.kind
                );
            }
        }
    }

    /// Closes every queue and waits until each worker has drained its backlog.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
