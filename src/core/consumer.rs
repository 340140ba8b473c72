//! # Consumer loop.
//!
//! ```text
//! while consumed < quota {
//!   ├─► full.wait()                  (blocks while the buffer is empty)
//!   ├─► [mutex] consumed += 1; publish ItemConsumed [/mutex]
//!   ├─► empty.signal(1)
//!   └─► sleep(consumer_delay)
//! }
//! ```
//!
//! The quota is per consumer and purely local: consumers never coordinate
//! with each other and need no external cancellation.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::{
    events::{Bus, Event, EventKind},
    sync::BufferSignals,
};

/// One consumer worker.
pub(crate) struct Consumer {
    pub index: usize,
    pub signals: Arc<BufferSignals>,
    pub bus: Bus,
    pub quota: u64,
    pub delay: Duration,
}

impl Consumer {
    /// Runs until `quota` items were taken; returns that count.
    pub(crate) fn run(self) -> u64 {
        let mut consumed: u64 = 0;

        while consumed < self.quota {
            self.signals.full.wait();
            {
                let cs = self.signals.enter();
                consumed += 1;
                cs.record_consumed();
                self.bus.publish(
                    Event::new(EventKind::ItemConsumed)
                        .with_worker(self.index)
                        .with_count(consumed),
                );
            }
            self.signals.empty.signal(1);

            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }
        consumed
    }
}
