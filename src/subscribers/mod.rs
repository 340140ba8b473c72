//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   workers ── publish(Event) ──► Bus sink ──► listener ──► SubscriberSet::emit(Event)
//!                                                               │
//!                                                    ┌──────────┼──────────┐
//!                                                    ▼          ▼          ▼
//!                                                LogWriter   Custom      ...
//! ```
//!
//! With `--silent` the binary attaches no `LogWriter`; events are still
//! published and custom subscribers still receive them.

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
