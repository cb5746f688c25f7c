//! Error types for retry orchestration.
//!
//! The controller produces exactly one failure of its own,
//! [`RetryError::ExceededMaxAttempts`]. Errors returned by the retried
//! operation are absorbed into the retry decision and never surface here.

use thiserror::Error;

/// Terminal failure reported on a controller's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RetryError {
    /// The configured maximum attempt count was used up without a success.
    #[error("exceeded maximum attempts after {attempt_count} attempt(s)")]
    ExceededMaxAttempts {
        /// Number of attempts made before giving up
        attempt_count: u32,
    },
}

impl RetryError {
    /// Number of attempts that were made before the error was produced.
    pub fn attempt_count(&self) -> u32 {
        match self {
            RetryError::ExceededMaxAttempts { attempt_count } => *attempt_count,
        }
    }
}

/// Errors raised while loading a [`RetryConfig`](crate::config::RetryConfig).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// An environment variable was set to a value that could not be parsed.
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        /// Name of the offending variable
        var: &'static str,
        /// The raw value that was rejected
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The requested backoff strategy name is not known.
    #[error("unknown backoff strategy: {0} (expected \"linear\" or \"exponential\")")]
    UnknownStrategy(String),
}
