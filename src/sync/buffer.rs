//! # Shared buffer state.
//!
//! The bounded buffer holds no items. It exists only as three counting signals:
//!
//! ```text
//!   mutex  (initial 1)         one worker inside the critical section
//!   empty  (initial capacity)  slots a producer may fill
//!   full   (initial 0)         items a consumer may take
//!
//! producer: empty.wait ─► [mutex] produce [/mutex] ─► full.signal
//! consumer: full.wait  ─► [mutex] consume [/mutex] ─► empty.signal
//! ```
//!
//! [`CriticalSection`] wraps the mutex signal as an RAII guard and keeps a few
//! occupancy gauges that tests and the run report read afterwards. The gauges
//! are written only while the guard is held.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::error::SignalError;
use crate::sync::CountingSignal;

/// The three signals of the logical bounded buffer.
#[derive(Debug)]
pub struct BufferSignals {
    /// Binary signal guarding the critical section.
    pub mutex: CountingSignal,
    /// Items available to consumers.
    pub full: CountingSignal,
    /// Free slots available to producers.
    pub empty: CountingSignal,
    gauges: Gauges,
}

#[derive(Debug, Default)]
struct Gauges {
    inside: AtomicUsize,
    peak_critical: AtomicUsize,
    produced: AtomicU64,
    consumed: AtomicU64,
    peak_in_flight: AtomicU64,
}

/// Read-only copy of the occupancy gauges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Occupancy {
    /// Most workers ever observed inside the critical section at once.
    pub peak_critical: usize,
    /// Largest `produced - consumed` seen before shutdown began.
    pub peak_in_flight: u64,
}

impl BufferSignals {
    /// Creates mutex(1), full(0) and empty(`capacity`).
    ///
    /// `producers` reserves headroom on `empty` and `full` for the shutdown
    /// release, which adds one unit per producer on top of `capacity`.
    pub fn new(capacity: usize, producers: usize) -> Result<Self, SignalError> {
        let headroom = capacity
            .checked_add(producers)
            .ok_or(SignalError::ExceedsMax {
                name: "empty",
                requested: usize::MAX,
                max: CountingSignal::MAX_COUNT,
            })?;

        Ok(Self {
            mutex: CountingSignal::new("mutex", 1)?,
            full: CountingSignal::with_headroom("full", 0, headroom)?,
            empty: CountingSignal::with_headroom("empty", capacity, headroom)?,
            gauges: Gauges::default(),
        })
    }

    /// Waits on the mutex signal and returns a guard that releases it on drop.
    pub fn enter(&self) -> CriticalSection<'_> {
        self.mutex.wait();
        let now = self.gauges.inside.fetch_add(1, Ordering::SeqCst) + 1;
        self.gauges.peak_critical.fetch_max(now, Ordering::Relaxed);
        CriticalSection { signals: self }
    }

    /// Adds `producers` units to the empty signal so every blocked producer
    /// can wake up once and observe the stop flag.
    pub fn release_producers(&self, producers: usize) {
        self.empty.signal(producers);
    }

    /// Snapshot of the occupancy gauges.
    pub fn occupancy(&self) -> Occupancy {
        Occupancy {
            peak_critical: self.gauges.peak_critical.load(Ordering::SeqCst),
            peak_in_flight: self.gauges.peak_in_flight.load(Ordering::SeqCst),
        }
    }
}

/// Exclusive access to the buffer bookkeeping; releases the mutex signal on drop.
#[must_use = "the critical section ends as soon as the guard is dropped"]
pub struct CriticalSection<'a> {
    signals: &'a BufferSignals,
}

impl CriticalSection<'_> {
    /// Records one produced item.
    ///
    /// `steady` is false once shutdown has started; items made from released
    /// slots do not count towards the in-flight peak.
    pub fn record_produced(&self, steady: bool) {
        let g = &self.signals.gauges;
        let produced = g.produced.fetch_add(1, Ordering::Relaxed) + 1;
        if steady {
            let in_flight = produced.saturating_sub(g.consumed.load(Ordering::Relaxed));
            g.peak_in_flight.fetch_max(in_flight, Ordering::Relaxed);
        }
    }

    /// Records one consumed item.
    pub fn record_consumed(&self) {
        self.signals.gauges.consumed.fetch_add(1, Ordering::Relaxed);
    }
}

impl Drop for CriticalSection<'_> {
    fn drop(&mut self) {
        self.signals.gauges.inside.fetch_sub(1, Ordering::SeqCst);
        self.signals.mutex.signal(1);
    }
}
