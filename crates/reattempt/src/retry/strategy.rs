//! Backoff strategies mapping an attempt ordinal to a wait duration.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

/// A schedule of delays between attempts.
///
/// `iteration` is the ordinal of the attempt about to be made. Iteration `0`
/// is the initial try and must always map to [`Duration::ZERO`] so the first
/// attempt fires immediately; iteration `n >= 1` is the `n`-th retry.
///
/// Implementations are pure: the same iteration always yields the same delay
/// and no state changes between calls.
///
/// # Examples
///
/// ```rust
/// use reattempt::retry::BackoffStrategy;
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// struct Fixed(Duration);
///
/// impl BackoffStrategy for Fixed {
///     fn time_to_wait(&self, iteration: u32) -> Duration {
///         if iteration == 0 { Duration::ZERO } else { self.0 }
///     }
/// }
///
/// assert_eq!(Fixed(Duration::from_secs(1)).time_to_wait(3), Duration::from_secs(1));
/// ```
pub trait BackoffStrategy: Debug + Send + Sync {
    /// Delay to wait before attempt number `iteration`.
    fn time_to_wait(&self, iteration: u32) -> Duration;
}

/// Built-in backoff schedules.
///
/// Delays are expressed in seconds as `f64`. Parameters are not validated:
/// a negative `delta` gives a decreasing schedule, and any raw value below
/// zero is waited as zero.
///
/// # Mathematical Formula
///
/// For iteration `n >= 1`:
/// ```text
/// Linear:      initial_delay + delta * (n - 1)
/// Exponential: initial_delay * exponent_base ^ (n - 1)
/// ```
///
/// # Examples
///
/// ```rust
/// use reattempt::retry::{Backoff, BackoffStrategy};
/// use std::time::Duration;
///
/// let linear = Backoff::linear(1.0, 5.0);
/// assert_eq!(linear.time_to_wait(0), Duration::ZERO);
/// assert_eq!(linear.time_to_wait(3), Duration::from_secs(11));
///
/// let exponential = Backoff::exponential(4.0, 2);
/// assert_eq!(exponential.time_to_wait(4), Duration::from_secs(32));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Backoff {
    /// Arithmetic progression starting at `initial_delay`.
    Linear {
        /// Delay before the first retry, in seconds
        initial_delay: f64,
        /// Added to the delay for every further retry, in seconds
        delta: f64,
    },
    /// Geometric progression starting at `initial_delay`.
    Exponential {
        /// Delay before the first retry, in seconds
        initial_delay: f64,
        /// Factor applied to the delay for every further retry
        exponent_base: i32,
    },
}

impl Backoff {
    /// Linear backoff: `initial_delay`, then `delta` more for each retry.
    pub fn linear(initial_delay: f64, delta: f64) -> Self {
        Backoff::Linear {
            initial_delay,
            delta,
        }
    }

    /// Exponential backoff: `initial_delay`, multiplied by `exponent_base`
    /// for each retry.
    pub fn exponential(initial_delay: f64, exponent_base: i32) -> Self {
        Backoff::Exponential {
            initial_delay,
            exponent_base,
        }
    }

    /// Raw delay in seconds before attempt `iteration`, before any clamping.
    pub fn seconds_to_wait(&self, iteration: u32) -> f64 {
        if iteration == 0 {
            return 0.0;
        }
        let steps = iteration - 1;
        match *self {
            Backoff::Linear {
                initial_delay,
                delta,
            } => initial_delay + delta * f64::from(steps),
            Backoff::Exponential {
                initial_delay,
                exponent_base,
            } => {
                let exponent = i32::try_from(steps).unwrap_or(i32::MAX);
                initial_delay * f64::from(exponent_base).powi(exponent)
            }
        }
    }
}

impl Default for Backoff {
    /// Exponential backoff starting at 5 seconds and doubling.
    fn default() -> Self {
        Backoff::exponential(5.0, 2)
    }
}

impl BackoffStrategy for Backoff {
    fn time_to_wait(&self, iteration: u32) -> Duration {
        duration_from_secs(self.seconds_to_wait(iteration))
    }
}

impl<S: BackoffStrategy + ?Sized> BackoffStrategy for Box<S> {
    fn time_to_wait(&self, iteration: u32) -> Duration {
        (**self).time_to_wait(iteration)
    }
}

/// Converts seconds to a `Duration`, flooring negatives and NaN at zero and
/// saturating overflow at `Duration::MAX`.
fn duration_from_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
