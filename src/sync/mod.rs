//! Blocking synchronization primitives shared by producers and consumers.
//!
//! ## Contents
//! - [`CountingSignal`] named counter with blocking `wait` and bulk `signal`
//! - [`BufferSignals`] the three signals that make up the logical bounded buffer
//! - [`CriticalSection`] RAII guard for the mutual-exclusion signal
//! - [`Occupancy`] gauges recorded inside the critical section
//!
//! These run on plain OS threads; nothing here touches the async runtime.

mod buffer;
mod signal;

pub use buffer::{BufferSignals, CriticalSection, Occupancy};
pub use signal::CountingSignal;
