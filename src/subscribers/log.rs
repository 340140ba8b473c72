//! # LogWriter: console event printer
//!
//! The subscriber behind the binary's console output. Item events and
//! milestones go to stdout, warnings go to stderr.
//!
//! ## Example output
//! ```text
//! Producer 0:	Produced item.
//! Consumer 3:	Consumed item.
//! Consumers are done.
//! All done.
//! Signals released.
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Line printed to stdout for `e`, if any.
    pub fn render(e: &Event) -> Option<String> {
        match e.kind {
            EventKind::ItemProduced => Some(format!(
                "Producer {}:\tProduced item.",
                e.worker.unwrap_or_default()
            )),
            EventKind::ItemConsumed => Some(format!(
                "Consumer {}:\tConsumed item.",
                e.worker.unwrap_or_default()
            )),
            EventKind::ConsumersDone => Some("Consumers are done.".to_string()),
            EventKind::AllDone => Some("All done.".to_string()),
            EventKind::SignalsReleased => Some("Signals released.".to_string()),
            EventKind::ProducersReleased | EventKind::DeadlockRisk => None,
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        if e.kind == EventKind::DeadlockRisk {
            eprintln!(
                "warning: {}",
                e.reason.as_deref().unwrap_or("configuration can never finish")
            );
            return;
        }
        if let Some(line) = Self::render(e) {
            println!("{line}");
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }

    fn queue_capacity(&self) -> usize {
        8192
    }
}
