//! Retry orchestration and backoff strategies.
//!
//! This module provides the retry control loop and the delay schedules it
//! follows between attempts.
//!
//! # Key Types
//!
//! - [`RetryController`] - Drives an operation until success or exhaustion
//! - [`BackoffStrategy`] - Core trait mapping an attempt ordinal to a delay
//! - [`Backoff`] - Built-in linear and exponential schedules
//!
//! # Examples
//!
//! ```rust
//! use reattempt::retry::{Backoff, RetryController};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let controller = RetryController::builder(|| async {
//!     // Your operation here
//!     Ok::<_, std::io::Error>(42)
//! })
//! .max_attempts(3)
//! .backoff(Backoff::exponential(0.1, 2))
//! .build();
//!
//! controller.start();
//! assert_eq!(controller.result().into_result().await, Ok(42));
//! # }
//! ```

mod controller;
mod strategy;

pub use crate::error::RetryError;
pub use controller::{RetryController, RetryControllerBuilder, retry};
pub use strategy::{Backoff, BackoffStrategy};
