//! # Run configuration.
//!
//! Provides [`Config`], the immutable snapshot every part of a run reads from.
//!
//! Config is built once (by [`cli::parse`](crate::cli::parse) or by hand) and then
//! moved into the [`Coordinator`](crate::Coordinator). Workers receive the values
//! they need at spawn time; nothing is mutated afterwards.
//!
//! ## Sentinel values
//! - `producer_delay = 0s` / `consumer_delay = 0s` → no pause between iterations
//! - `bus_capacity = 0` → clamped to 1 by the bus

use std::time::Duration;

/// Configuration for one producer/consumer run.
///
/// ## Field semantics
/// - `capacity`: number of slots in the logical buffer (initial value of the empty signal)
/// - `producers` / `consumers`: worker counts
/// - `consumer_quota`: items each consumer takes before exiting (per consumer, not global)
/// - `producer_delay` / `consumer_delay`: pause after every iteration
/// - `silent`: suppress the per-event console output
/// - `report`: print a run summary to stderr at the end
/// - `bus_capacity`: bound of the event bus sink and tap ring
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of items the buffer may hold at once.
    pub capacity: usize,

    /// Number of producer threads.
    pub producers: usize,

    /// Number of consumer threads.
    pub consumers: usize,

    /// Items each consumer processes before it terminates.
    ///
    /// Total consumption of a run is `consumers × consumer_quota`.
    pub consumer_quota: u64,

    /// Pause after each produced item. Not interruptible.
    pub producer_delay: Duration,

    /// Pause after each consumed item. Not interruptible.
    pub consumer_delay: Duration,

    /// Do not attach the console log writer.
    pub silent: bool,

    /// Print the [`RunReport`](crate::RunReport) summary once the run ends.
    pub report: bool,

    /// Capacity of the event bus.
    ///
    /// Subscribers are fed through a sink of this size; publishers wait while it
    /// is full. Extra tap receivers that lag behind more than `bus_capacity`
    /// events skip the oldest ones.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Items the whole run is expected to consume.
    #[inline]
    pub fn expected_consumption(&self) -> u64 {
        self.consumer_quota.saturating_mul(self.consumers as u64)
    }

    /// Describes why this configuration can never finish, if it cannot.
    ///
    /// Consumers wait for items with no timeout, so a run where no item can
    /// ever be produced hangs forever. This is reported, never corrected.
    pub fn deadlock_risk(&self) -> Option<&'static str> {
        if self.consumers == 0 || self.consumer_quota == 0 {
            return None;
        }
        if self.producers == 0 {
            Some(
                "no producers configured but consumers expect items; the run will never finish",
            )
        } else if self.capacity == 0 {
            Some(
                "buffer capacity is zero but consumers expect items; the run will never finish",
            )
        } else {
            None
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `capacity = 20`
    /// - `producers = 5`, `consumers = 5`
    /// - `consumer_quota = 25`
    /// - `producer_delay = consumer_delay = 1s`
    /// - `silent = false`, `report = false`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            capacity: 20,
            producers: 5,
            consumers: 5,
            consumer_quota: 25,
            producer_delay: Duration::from_secs(1),
            consumer_delay: Duration::from_secs(1),
            silent: false,
            report: false,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_command_line_table() {
        let cfg = Config::default();
        assert_eq!(cfg.capacity, 20);
        assert_eq!(cfg.producers, 5);
        assert_eq!(cfg.consumers, 5);
        assert_eq!(cfg.consumer_quota, 25);
        assert_eq!(cfg.producer_delay, Duration::from_secs(1));
        assert_eq!(cfg.consumer_delay, Duration::from_secs(1));
        assert!(!cfg.silent);
        assert!(!cfg.report);
        assert_eq!(cfg.expected_consumption(), 125);
    }

    #[test]
    fn test_bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn test_deadlock_risk_without_producers() {
        let cfg = Config {
            producers: 0,
            consumers: 1,
            consumer_quota: 1,
            ..Config::default()
        };
        assert!(cfg.deadlock_risk().is_some());
    }

    #[test]
    fn test_deadlock_risk_with_zero_capacity() {
        let cfg = Config {
            capacity: 0,
            ..Config::default()
        };
        assert!(cfg.deadlock_risk().is_some());
    }

    #[test]
    fn test_no_risk_when_nothing_is_consumed() {
        let no_quota = Config {
            producers: 0,
            consumer_quota: 0,
            ..Config::default()
        };
        let no_consumers = Config {
            producers: 0,
            consumers: 0,
            ..Config::default()
        };
        assert_eq!(no_quota.deadlock_risk(), None);
        assert_eq!(no_consumers.deadlock_risk(), None);
        assert_eq!(Config::default().deadlock_risk(), None);
    }
}
