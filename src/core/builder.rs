use std::sync::Arc;

use crate::{
    config::Config,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

use super::coordinator::Coordinator;

/// Builder for constructing a [`Coordinator`] with optional subscribers.
pub struct CoordinatorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl CoordinatorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers, replacing any added before.
    ///
    /// Subscribers receive every runtime event through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the coordinator.
    ///
    /// Creates the event bus and spawns the subscriber workers, so it must be
    /// called from within a tokio runtime. Without subscribers the bus gets no
    /// sink and publishing never waits.
    pub fn build(self) -> Coordinator {
        let capacity = self.cfg.bus_capacity_clamped();
        let subs = SubscriberSet::new(self.subscribers);
        let (bus, sink) = if subs.is_empty() {
            (Bus::new(capacity), None)
        } else {
            let (bus, rx) = Bus::with_sink(capacity);
            (bus, Some(rx))
        };
        Coordinator::new_internal(self.cfg, bus, sink, subs)
    }
}
