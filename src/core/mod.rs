//! Runtime core: the coordination protocol and its workers.
//!
//! The public API from this module is [`Coordinator`] (with its builder),
//! [`drive`] for running the protocol on the current thread, [`RunReport`]
//! and [`Role`].
//!
//! Internal modules:
//! - [`coordinator`]: spawns both worker groups and runs the shutdown protocol;
//! - [`producer`]: the producer loop;
//! - [`consumer`]: the consumer loop;
//! - [`worker`]: typed, named OS threads;
//! - [`report`]: totals of a finished run.

mod builder;
mod consumer;
mod coordinator;
mod producer;
mod report;
mod worker;

pub use builder::CoordinatorBuilder;
pub use coordinator::{Coordinator, drive};
pub use report::RunReport;
pub use worker::Role;
