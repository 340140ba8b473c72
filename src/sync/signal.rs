//! # Counting signal.
//!
//! [`CountingSignal`] holds a non-negative count behind a `Mutex` and parks
//! waiters on a `Condvar`.
//!
//! ```text
//! wait():       count == 0 ? park : count -= 1
//! signal(n):    count += n ; wake up to n parked waiters
//! ```
//!
//! ## Rules
//! - The count never goes negative; `wait` blocks until it can decrement.
//! - `signal` never blocks.
//! - The count never exceeds [`CountingSignal::MAX_COUNT`]; creation rejects
//!   values above it and an overflowing `signal` aborts the thread.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::SignalError;

/// Blocking counter with `wait` (decrement) and `signal` (increment by `n`).
#[derive(Debug)]
pub struct CountingSignal {
    name: &'static str,
    count: Mutex<usize>,
    ready: Condvar,
}

impl CountingSignal {
    /// Highest count a signal may hold (the System V `SEMVMX` ceiling).
    pub const MAX_COUNT: usize = 32_767;

    /// Creates a signal with the given initial count.
    ///
    /// Fails if `initial` is above [`MAX_COUNT`](Self::MAX_COUNT).
    pub fn new(name: &'static str, initial: usize) -> Result<Self, SignalError> {
        Self::with_headroom(name, initial, initial)
    }

    /// Creates a signal that must be able to reach `headroom` later on.
    ///
    /// Use this when the caller knows the count will be topped up past its
    /// initial value (the empty-slot signal at shutdown).
    pub fn with_headroom(
        name: &'static str,
        initial: usize,
        headroom: usize,
    ) -> Result<Self, SignalError> {
        let requested = initial.max(headroom);
        if requested > Self::MAX_COUNT {
            return Err(SignalError::ExceedsMax {
                name,
                requested,
                max: Self::MAX_COUNT,
            });
        }
        Ok(Self {
            name,
            count: Mutex::new(initial),
            ready: Condvar::new(),
        })
    }

    /// Name given at creation.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Blocks until the count is at least one, then decrements it.
    pub fn wait(&self) {
        let guard = self.lock();
        let mut count = self
            .ready
            .wait_while(guard, |count| *count == 0)
            .unwrap_or_else(PoisonError::into_inner);
        *count -= 1;
    }

    /// Increments the count by `n` and wakes up to `n` waiters.
    ///
    /// `n == 0` is a no-op.
    ///
    /// # Panics
    /// If the count would exceed [`MAX_COUNT`](Self::MAX_COUNT). Callers size
    /// signals at creation so this only happens on a protocol bug.
    pub fn signal(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut count = self.lock();
        match count.checked_add(n).filter(|c| *c <= Self::MAX_COUNT) {
            Some(next) => *count = next,
            None => panic!(
                "counting signal '{}' overflowed: {} + {} > {}",
                self.name,
                *count,
                n,
                Self::MAX_COUNT
            ),
        }
        drop(count);

        if n == 1 {
            self.ready.notify_one();
        } else {
            self.ready.notify_all();
        }
    }

    #[cfg(test)]
    pub(crate) fn available(&self) -> usize {
        *self.lock()
    }

    // No user code runs under this lock, so a poisoned count is still consistent.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
