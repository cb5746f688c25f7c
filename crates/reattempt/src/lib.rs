#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry orchestration for asynchronous operations.
//!
//! This crate turns a single unreliable asynchronous call into a resilient
//! one without repeating retry logic at every call site:
//!
//! - **Retry control loop** via [`RetryController`](retry::RetryController)
//!   - Optional attempt budget, unbounded by default
//!   - Single-resolution outcome shared by any number of observers
//!   - Weakly referenced continuations, so dropping the controller abandons
//!     pending attempts
//! - **Backoff schedules** via the [`BackoffStrategy`](retry::BackoffStrategy) trait
//!   - Linear and exponential built-ins
//! - **Pluggable scheduling** via the [`Scheduler`](scheduler::Scheduler) trait,
//!   with a tokio implementation
//! - **Configuration** via [`RetryConfig`](config::RetryConfig), loadable from
//!   serde documents or environment variables
//!
//! Every failure of the operation is retried; the operation's own error is
//! never surfaced. The only failure reported on the outcome is exhaustion of
//! the attempt budget.
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use reattempt::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let controller = RetryController::builder(|| async {
//!     Ok::<_, std::io::Error>(42)
//! })
//! .max_attempts(3)
//! .backoff(Backoff::linear(1.0, 0.5))
//! .build();
//!
//! controller.start();
//! assert_eq!(controller.result().wait().await, &Ok(42));
//! # }
//! ```

pub mod config;
pub mod error;
pub mod outcome;
pub mod retry;
pub mod scheduler;

/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use reattempt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::RetryConfig;
    pub use crate::error::{ConfigError, RetryError};
    pub use crate::outcome::Outcome;
    pub use crate::retry::{
        Backoff, BackoffStrategy, RetryController, RetryControllerBuilder, retry,
    };
    pub use crate::scheduler::{Scheduler, Task, TokioScheduler};
}
