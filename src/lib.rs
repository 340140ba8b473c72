//! # semvisor
//!
//! **semvisor** runs the classic bounded-buffer producer/consumer protocol on
//! OS threads and reports what happened through an event bus.
//!
//! Producers and consumers share a logical buffer of `capacity` slots. The
//! buffer stores nothing: it is three counting signals.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌────────────┐   ┌────────────┐        ┌────────────┐   ┌────────────┐
//!   │ producer-0 │ … │ producer-P │        │ consumer-0 │ … │ consumer-C │
//!   └─────┬──────┘   └─────┬──────┘        └─────┬──────┘   └─────┬──────┘
//!         │ empty.wait     │                     │ full.wait      │
//!         ▼                ▼                     ▼                ▼
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  BufferSignals                                                        │
//! │  - mutex (1)        one worker inside the critical section            │
//! │  - empty (capacity) free slots                                        │
//! │  - full  (0)        available items                                   │
//! └───────────────────────────────┬───────────────────────────────────────┘
//!                                 │ publish(Event) inside the critical section
//!                                 ▼
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │          Bus (bounded sink, waits when full; lossy taps)              │
//! └───────────────────────────────┬───────────────────────────────────────┘
//!                                 ▼
//!                       listener ──► SubscriberSet ──► LogWriter / custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! Config ──► Coordinator::run() ──► spawn_blocking(drive)
//!
//! drive:
//!   ├─► create signals
//!   ├─► spawn producers, spawn consumers
//!   ├─► join consumers           (each stops at its own quota)
//!   ├─► stop flag = true
//!   ├─► empty.signal(producers)  (wake every parked producer once)
//!   ├─► join producers
//!   └─► release signals
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                    |
//! |-------------------|----------------------------------------------------------|---------------------------------------|
//! | **Signals**       | Blocking counting signals and the buffer built on them.  | [`CountingSignal`], [`BufferSignals`] |
//! | **Coordination**  | Worker groups and the shutdown protocol.                 | [`Coordinator`], [`drive`]            |
//! | **Events**        | Item events and milestones on a backpressured bus.       | [`Event`], [`EventKind`], [`Bus`]     |
//! | **Subscriber API**| Hook into the event stream (console output, custom).     | [`Subscribe`], [`LogWriter`]          |
//! | **Errors**        | Typed errors for configuration and runtime.              | [`ConfigError`], [`RuntimeError`]     |
//! | **Configuration** | Immutable run settings and CLI parsing.                  | [`Config`], [`cli::parse`]            |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use semvisor::{Config, Coordinator, LogWriter, Subscribe};
//!
//! #[tokio::main(flavor = "multi_thread", worker_threads = 2)]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         capacity: 1,
//!         producers: 1,
//!         consumers: 1,
//!         consumer_quota: 3,
//!         producer_delay: Duration::ZERO,
//!         consumer_delay: Duration::ZERO,
//!         ..Config::default()
//!     };
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let report = Coordinator::builder(cfg).with_subscribers(subs).build().run().await?;
//!
//!     assert_eq!(report.consumed, vec![3]);
//!     Ok(())
//! }
//! ```

pub mod cli;
mod config;
mod core;
mod error;
mod events;
mod subscribers;
mod sync;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{Coordinator, CoordinatorBuilder, Role, RunReport, drive};
pub use error::{ConfigError, RuntimeError, SignalError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use sync::{BufferSignals, CountingSignal, CriticalSection, Occupancy};
