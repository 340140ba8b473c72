//! Runtime events: types and the event bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by producers, consumers and the coordinator.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] lossless sink for subscribers plus lossy `tokio::sync::broadcast` taps
//!
//! ## Quick reference
//! - **Publishers**: producer and consumer threads (item events), the coordinator (milestones).
//! - **Consumers**: the coordinator's listener task, which fans out to the `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
