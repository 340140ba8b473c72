use std::fmt;
use std::time::Duration;

/// Totals and gauges of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    /// Items made by each producer, by index.
    pub produced: Vec<u64>,
    /// Items taken by each consumer, by index.
    pub consumed: Vec<u64>,
    /// Empty slots force-released at shutdown.
    pub released: usize,
    /// Largest `produced - consumed` observed before the stop flag was set.
    pub peak_in_flight: u64,
    /// Most workers ever inside the critical section at once.
    pub peak_critical: usize,
    /// Wall time from signal creation to signal release.
    pub elapsed: Duration,
}

impl RunReport {
    pub fn total_produced(&self) -> u64 {
        self.produced.iter().sum()
    }

    pub fn total_consumed(&self) -> u64 {
        self.consumed.iter().sum()
    }

    /// Items still sitting in the buffer when the run ended.
    pub fn leftover(&self) -> u64 {
        self.total_produced().saturating_sub(self.total_consumed())
    }
}

/// One-line summary, e.g. `produced 27, consumed 25, leftover 2, released 5, elapsed 1.204s`.
impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "produced {}, consumed {}, leftover {}, released {}, elapsed {:.3}s",
            self.total_produced(),
            self.total_consumed(),
            self.leftover(),
            self.released,
            self.elapsed.as_secs_f64()
        )
    }
}
