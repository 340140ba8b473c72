//! # Command line parsing.
//!
//! Turns process arguments into a [`Command`]. Flags follow the classic
//! single-dash short forms (`-bs`, `-cl`, ...) which is why this is a small
//! hand-written loop rather than a derive-based parser.
//!
//! ```text
//! -s,   --silent                  Do not print any output
//! -r,   --report                  Print a run summary to stderr at the end
//! -bs,  --buffer-size N           Buffer size (default: 20)
//! -c,   --consumers N             Number of consumer threads (default: 5)
//! -p,   --producers N             Number of producer threads (default: 5)
//! -cl,  --consumer-limit N        Consumer consumption stop limit (default: 25)
//! -cs,  --consumer-sleep TIME     Consumer sleep time in seconds (default: 1)
//! -ps,  --producer-sleep TIME     Producer sleep time in seconds (default: 1)
//! -h,   --help                    Display this help and exit
//! ```
//!
//! `TIME` keeps whole-second granularity: `0.5` and `0.001` both mean `0`.

use std::time::Duration;

use crate::{config::Config, error::ConfigError};

/// Usage text printed by `--help`.
pub const USAGE: &str = "\
Usage: semvisor [OPTIONS]
Options:
\t-s,   --silent                  Do not print any output
\t-r,   --report                  Print a run summary to stderr at the end
\t-bs,  --buffer-size N           Buffer size (default: 20)
\t-c,   --consumers N             Number of consumer threads (default: 5)
\t-p,   --producers N             Number of producer threads (default: 5)
\t-cl,  --consumer-limit N        Consumer consumption stop limit (default: 25)
\t-cs,  --consumer-sleep TIME     Consumer sleep time in seconds (default: 1)
\t-ps,  --producer-sleep TIME     Producer sleep time in seconds (default: 1)
\t-h,   --help                    Display this help and exit
";

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the producer/consumer demo with this configuration.
    Run(Config),
    /// Print [`USAGE`] and exit successfully.
    Help,
}

/// Parses arguments (without the program name) into a [`Command`].
///
/// Flags are processed left to right. `--help` wins as soon as it is seen;
/// the first malformed flag stops parsing with an error.
///
/// # Example
/// ```
/// use semvisor::cli::{parse, Command};
///
/// let Command::Run(cfg) = parse(["-bs", "4", "-s"]).unwrap() else { panic!() };
/// assert_eq!(cfg.capacity, 4);
/// assert!(cfg.silent);
/// ```
pub fn parse<I, S>(args: I) -> Result<Command, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cfg = Config::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let flag = arg.as_ref();
        match flag {
            "-s" | "--silent" => cfg.silent = true,
            "-r" | "--report" => cfg.report = true,
            "-bs" | "--buffer-size" => {
                cfg.capacity = parse_count(flag, next_value(&mut args, flag)?)?
            }
            "-c" | "--consumers" => {
                cfg.consumers = parse_count(flag, next_value(&mut args, flag)?)?
            }
            "-p" | "--producers" => {
                cfg.producers = parse_count(flag, next_value(&mut args, flag)?)?
            }
            "-cl" | "--consumer-limit" => {
                cfg.consumer_quota = parse_count(flag, next_value(&mut args, flag)?)?
            }
            "-cs" | "--consumer-sleep" => {
                cfg.consumer_delay = parse_seconds(flag, next_value(&mut args, flag)?)?
            }
            "-ps" | "--producer-sleep" => {
                cfg.producer_delay = parse_seconds(flag, next_value(&mut args, flag)?)?
            }
            "-h" | "--help" => return Ok(Command::Help),
            other => {
                return Err(ConfigError::UnknownFlag {
                    flag: other.to_string(),
                });
            }
        }
    }
    Ok(Command::Run(cfg))
}

fn next_value<I, S>(args: &mut I, flag: &str) -> Result<String, ConfigError>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    args.next()
        .map(|v| v.as_ref().to_string())
        .ok_or_else(|| ConfigError::MissingValue {
            flag: flag.to_string(),
        })
}

fn parse_count<T: std::str::FromStr>(flag: &str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue {
            flag: flag.to_string(),
            value,
            reason: "expected a non-negative integer",
        })
}

/// Whole seconds, truncating any fractional part.
fn parse_seconds(flag: &str, value: String) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    if let Ok(secs) = trimmed.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    match trimmed.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => {
            Ok(Duration::from_secs(secs.trunc() as u64))
        }
        _ => Err(ConfigError::InvalidValue {
            flag: flag.to_string(),
            value,
            reason: "expected a non-negative number of seconds",
        }),
    }
}
