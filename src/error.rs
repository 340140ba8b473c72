//! Error types used by the semvisor runtime and its command line.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`]: invalid command line input, reported before any worker starts.
//! - [`SignalError`]: a counting signal could not be created.
//! - [`RuntimeError`]: failures of the coordination protocol itself.
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logging.

use std::io;

use thiserror::Error;

use crate::core::Role;

/// # Errors produced while turning command line arguments into a [`Config`](crate::Config).
///
/// None of these are recoverable: the binary prints the diagnostic and exits
/// with a nonzero status before spawning anything.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A flag that is not part of the command line surface.
    #[error("Unknown option: {flag}")]
    UnknownFlag {
        /// The flag as typed by the user.
        flag: String,
    },

    /// A value-taking flag was the last argument.
    #[error("missing value for '{flag}'")]
    MissingValue {
        /// The flag that expected a value.
        flag: String,
    },

    /// A flag value could not be parsed.
    #[error("invalid value '{value}' for '{flag}': {reason}")]
    InvalidValue {
        /// The flag the value belongs to.
        flag: String,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use semvisor::ConfigError;
    ///
    /// let err = ConfigError::MissingValue { flag: "--buffer-size".into() };
    /// assert_eq!(err.as_label(), "config_missing_value");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::UnknownFlag { .. } => "config_unknown_flag",
            ConfigError::MissingValue { .. } => "config_missing_value",
            ConfigError::InvalidValue { .. } => "config_invalid_value",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::UnknownFlag { flag } => format!("unknown flag: {flag}"),
            ConfigError::MissingValue { flag } => format!("flag {flag} expects a value"),
            ConfigError::InvalidValue {
                flag,
                value,
                reason,
            } => format!("flag {flag} rejected {value:?}: {reason}"),
        }
    }
}

/// # Errors produced while creating a counting signal.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The signal would need to hold more than the supported maximum count.
    #[error("signal '{name}' needs headroom for {requested} units; maximum is {max}")]
    ExceedsMax {
        /// Name of the signal being created.
        name: &'static str,
        /// Count the signal must be able to reach.
        requested: usize,
        /// Supported ceiling.
        max: usize,
    },
}

impl SignalError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SignalError::ExceedsMax { .. } => "signal_exceeds_max",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SignalError::ExceedsMax {
                name,
                requested,
                max,
            } => format!("{name}: requested={requested} max={max}"),
        }
    }
}

/// # Errors produced by the coordination protocol.
///
/// Startup failures (`Signal`, `Spawn`) are fatal: the run is abandoned and
/// any worker that was already started is left to the process exit.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shared buffer signals could not be created.
    #[error("failed to create buffer signals: {0}")]
    Signal(#[from] SignalError),

    /// The OS refused to start a worker thread.
    #[error("failed to spawn {role} {index}: {source}")]
    Spawn {
        /// Kind of the worker.
        role: Role,
        /// Worker index.
        index: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A worker thread panicked instead of returning its total.
    #[error("{role} {index} panicked")]
    WorkerPanicked {
        /// Kind of the worker.
        role: Role,
        /// Worker index.
        index: usize,
    },

    /// Signals were still referenced after every worker had been joined.
    #[error("buffer signals still shared after all workers joined")]
    SignalsInUse,

    /// The blocking protocol thread did not complete.
    #[error("coordinator protocol aborted: {reason}")]
    Protocol {
        /// Join failure description.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use semvisor::{RuntimeError, Role};
    ///
    /// let err = RuntimeError::WorkerPanicked { role: Role::Consumer, index: 2 };
    /// assert_eq!(err.as_label(), "runtime_worker_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Signal(_) => "runtime_signal",
            RuntimeError::Spawn { .. } => "runtime_spawn",
            RuntimeError::WorkerPanicked { .. } => "runtime_worker_panicked",
            RuntimeError::SignalsInUse => "runtime_signals_in_use",
            RuntimeError::Protocol { .. } => "runtime_protocol",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Signal(e) => format!("signal: {}", e.as_message()),
            RuntimeError::Spawn {
                role,
                index,
                source,
            } => format!("spawn {role}-{index}: {source}"),
            RuntimeError::WorkerPanicked { role, index } => format!("{role}-{index} panicked"),
            RuntimeError::SignalsInUse => "signals still referenced".to_string(),
            RuntimeError::Protocol { reason } => format!("protocol: {reason}"),
        }
    }

    /// Indicates whether the failure happened before any worker was running.
    pub fn is_startup(&self) -> bool {
        matches!(self, RuntimeError::Signal(_) | RuntimeError::Spawn { .. })
    }
}
