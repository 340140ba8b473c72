//! # Producer loop.
//!
//! ```text
//! while !stop.is_cancelled() {
//!   ├─► empty.wait()                 (blocks while the buffer is full)
//!   ├─► [mutex] publish ItemProduced [/mutex]
//!   ├─► full.signal(1)
//!   └─► sleep(producer_delay)        (not interruptible)
//! }
//! ```
//!
//! ## Rules
//! - The stop flag is only polled at the top of the loop. A producer parked in
//!   `empty.wait()` cannot see it; the coordinator releases one empty slot per
//!   producer after setting the flag so every parked producer finishes one
//!   last cycle and exits.
//! - A producer past `empty.wait()` always completes its cycle.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    events::{Bus, Event, EventKind},
    sync::BufferSignals,
};

/// One producer worker.
pub(crate) struct Producer {
    pub index: usize,
    pub signals: Arc<BufferSignals>,
    pub bus: Bus,
    pub stop: CancellationToken,
    pub delay: Duration,
}

impl Producer {
    /// Runs until the stop flag is observed; returns the number of items produced.
    pub(crate) fn run(self) -> u64 {
        let mut produced: u64 = 0;

        while !self.stop.is_cancelled() {
            self.signals.empty.wait();
            {
                let cs = self.signals.enter();
                produced += 1;
                cs.record_produced(!self.stop.is_cancelled());
                self.bus.publish(
                    Event::new(EventKind::ItemProduced)
                        .with_worker(self.index)
                        .with_count(produced),
                );
            }
            self.signals.full.signal(1);

            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }
        produced
    }
}
