//! # Typed worker threads.
//!
//! Every producer and consumer runs on its own named OS thread
//! (`producer-0`, `consumer-3`, ...). [`spawn`] owns the index and the shared
//! handles it is given, so no worker ever aliases another's state.

use std::fmt;
use std::thread::{self, JoinHandle};

use crate::error::RuntimeError;

/// Which side of the buffer a worker sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Fills empty slots.
    Producer,
    /// Drains full slots.
    Consumer,
}

impl Role {
    /// Lowercase name used in thread names and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Producer => "producer",
            Role::Consumer => "consumer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A running worker thread; joining yields its item total.
pub(crate) struct WorkerHandle {
    role: Role,
    index: usize,
    handle: JoinHandle<u64>,
}

impl WorkerHandle {
    /// Blocks until the worker returns.
    pub(crate) fn join(self) -> Result<u64, RuntimeError> {
        self.handle.join().map_err(|_| RuntimeError::WorkerPanicked {
            role: self.role,
            index: self.index,
        })
    }
}

/// Starts `body` on a new thread named `<role>-<index>`.
pub(crate) fn spawn<F>(role: Role, index: usize, body: F) -> Result<WorkerHandle, RuntimeError>
where
    F: FnOnce() -> u64 + Send + 'static,
{
    let handle = thread::Builder::new()
        .name(format!("{role}-{index}"))
        .spawn(body)
        .map_err(|source| RuntimeError::Spawn {
            role,
            index,
            source,
        })?;
    Ok(WorkerHandle {
        role,
        index,
        handle,
    })
}
