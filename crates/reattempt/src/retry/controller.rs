//! The retry control loop.

use super::strategy::{Backoff, BackoffStrategy};
use crate::config::RetryConfig;
use crate::error::RetryError;
use crate::outcome::{Outcome, OutcomeSlot};
use crate::scheduler::{Scheduler, TokioScheduler};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

const DEFAULT_NAME: &str = "retry";

type PendingAttempt<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;
type BoxedOperation<T, E> = Box<dyn Fn() -> PendingAttempt<T, E> + Send + Sync>;

/// Drives an unreliable asynchronous operation until it succeeds or the
/// attempt budget runs out.
///
/// A controller is created unstarted. [`start`](Self::start) schedules the
/// first attempt immediately; every failure schedules the next attempt after
/// the delay given by the backoff strategy. The terminal result is published
/// once on the [`Outcome`] returned by [`result`](Self::result):
///
/// - the operation's value on the first success, or
/// - [`RetryError::ExceededMaxAttempts`] when a bounded budget is used up.
///
/// Errors returned by the operation are never inspected or surfaced; every
/// failure is retried.
///
/// Scheduled attempts only hold a weak reference to the controller. Dropping
/// the last `RetryController` abandons the sequence: pending attempts do
/// nothing when they fire and the outcome is never resolved.
///
/// # Examples
///
/// ```rust
/// use reattempt::retry::{Backoff, RetryController, RetryError};
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let controller = RetryController::builder(|| async {
///     Err::<(), _>(std::io::Error::other("still down"))
/// })
/// .max_attempts(3)
/// .backoff(Backoff::linear(0.1, 0.1))
/// .build();
///
/// controller.start();
/// let outcome = controller.result().into_result().await;
/// assert_eq!(outcome, Err(RetryError::ExceededMaxAttempts { attempt_count: 3 }));
/// # }
/// ```
pub struct RetryController<T, E> {
    inner: Arc<Inner<T, E>>,
}

struct Inner<T, E> {
    name: String,
    max_attempts: Option<u32>,
    backoff: Arc<dyn BackoffStrategy>,
    operation: BoxedOperation<T, E>,
    scheduler: Arc<dyn Scheduler>,
    started: AtomicBool,
    iteration: AtomicU32,
    outcome: Arc<OutcomeSlot<T>>,
}

impl<T, E> RetryController<T, E>
where
    T: Send + Sync + 'static,
    E: Send + 'static,
{
    /// Create an unstarted controller with default settings.
    ///
    /// Defaults:
    /// - `max_attempts`: unbounded
    /// - `backoff`: exponential, 5s initial delay, base 2
    /// - `scheduler`: [`TokioScheduler::default`]
    pub fn new<F, Fut>(operation: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::builder(operation).build()
    }

    /// Create a builder for configuring a controller around `operation`.
    pub fn builder<F, Fut>(operation: F) -> RetryControllerBuilder<T, E>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        RetryControllerBuilder::new(Box::new(move || -> PendingAttempt<T, E> {
            Box::pin(operation())
        }))
    }

    /// Begin the attempt loop.
    ///
    /// Only the first call has an effect; later calls are ignored. Returns
    /// immediately, progress happens on the scheduler.
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::AcqRel) {
            tracing::debug!(retry = %self.inner.name, "controller already started, ignoring start");
            return;
        }

        tracing::debug!(
            retry = %self.inner.name,
            max_attempts = ?self.inner.max_attempts,
            "starting retry sequence"
        );
        self.inner.run(self.inner.max_attempts, 0, Duration::ZERO);
    }

    /// Handle to the terminal result of this sequence.
    pub fn result(&self) -> Outcome<T> {
        Outcome::new(Arc::clone(&self.inner.outcome))
    }

    /// Number of attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.inner.iteration.load(Ordering::Acquire)
    }

    /// Whether [`start`](Self::start) has been called.
    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::Acquire)
    }

    /// The configured attempt budget, `None` if unbounded.
    pub fn max_attempts(&self) -> Option<u32> {
        self.inner.max_attempts
    }

    /// Name used in log events for this controller.
    pub fn name(&self) -> &str {
        &self.inner.name
    }
}

impl<T, E> Inner<T, E>
where
    T: Send + Sync + 'static,
    E: Send + 'static,
{
    /// Resolve exhaustion, or schedule the next attempt after `delay`.
    ///
    /// Re-entered from the continuation of each failed attempt, so every
    /// retry runs as a fresh scheduled task rather than a nested call.
    fn run(self: &Arc<Self>, remaining_attempts: Option<u32>, iteration: u32, delay: Duration) {
        if remaining_attempts == Some(0) {
            tracing::error!(
                retry = %self.name,
                attempts = iteration,
                "all retry attempts exhausted"
            );
            self.outcome.resolve(Err(RetryError::ExceededMaxAttempts {
                attempt_count: iteration,
            }));
            return;
        }

        let weak = Arc::downgrade(self);
        self.scheduler.after(
            delay,
            Box::pin(Self::attempt(weak, remaining_attempts, iteration)),
        );
    }

    async fn attempt(weak: Weak<Self>, remaining_attempts: Option<u32>, iteration: u32) {
        let attempt = iteration.saturating_add(1);

        // The strong reference is released before awaiting the operation so an
        // in-flight attempt does not keep an abandoned controller alive.
        let pending = {
            let Some(this) = weak.upgrade() else {
                tracing::debug!(attempt, "controller dropped, skipping attempt");
                return;
            };
            if this.outcome.get().is_some() {
                return;
            }

            this.iteration.fetch_add(1, Ordering::AcqRel);
            tracing::debug!(retry = %this.name, attempt, "starting attempt");
            (this.operation)()
        };

        let result = pending.await;

        let Some(this) = weak.upgrade() else {
            tracing::debug!(attempt, "controller dropped while attempt was in flight");
            return;
        };

        match result {
            Ok(value) => {
                if iteration > 0 {
                    tracing::info!(retry = %this.name, attempt, "succeeded after retry");
                } else {
                    tracing::debug!(retry = %this.name, "succeeded on first attempt");
                }
                this.outcome.resolve(Ok(value));
            }
            Err(_) => {
                // `attempt` attempts have been made; the next one is retry number `attempt`.
                let delay = this.backoff.time_to_wait(attempt);
                let remaining = remaining_attempts.map(|r| r.saturating_sub(1));

                if remaining != Some(0) {
                    tracing::warn!(
                        retry = %this.name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "attempt failed, will retry"
                    );
                }
                this.run(remaining, attempt, delay);
            }
        }
    }
}

impl<T, E> fmt::Debug for RetryController<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryController")
            .field("name", &self.inner.name)
            .field("max_attempts", &self.inner.max_attempts)
            .field("backoff", &self.inner.backoff)
            .field("started", &self.inner.started.load(Ordering::Acquire))
            .field("attempts", &self.inner.iteration.load(Ordering::Acquire))
            .field("resolved", &self.inner.outcome.get().is_some())
            .finish()
    }
}

/// Builder for configuring a [`RetryController`].
///
/// # Examples
///
/// ```rust
/// use reattempt::retry::{Backoff, RetryController};
/// use reattempt::scheduler::TokioScheduler;
///
/// let controller = RetryController::builder(|| async { Ok::<_, std::io::Error>("pong") })
///     .name("ping")
///     .max_attempts(5)
///     .backoff(Backoff::exponential(0.5, 2))
///     .scheduler(TokioScheduler::default())
///     .build();
///
/// assert_eq!(controller.max_attempts(), Some(5));
/// assert!(!controller.is_started());
/// ```
pub struct RetryControllerBuilder<T, E> {
    operation: BoxedOperation<T, E>,
    name: Option<String>,
    max_attempts: Option<u32>,
    backoff: Arc<dyn BackoffStrategy>,
    scheduler: Arc<dyn Scheduler>,
}

impl<T, E> RetryControllerBuilder<T, E>
where
    T: Send + Sync + 'static,
    E: Send + 'static,
{
    fn new(operation: BoxedOperation<T, E>) -> Self {
        Self {
            operation,
            name: None,
            max_attempts: None,
            backoff: Arc::new(Backoff::default()),
            scheduler: Arc::new(TokioScheduler::default()),
        }
    }

    /// Name attached to log events.
    ///
    /// Default: `"retry"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Give up after `max_attempts` attempts.
    ///
    /// `0` resolves the outcome with exhaustion as soon as the controller is
    /// started, without invoking the operation.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Retry until success. This is the default.
    pub fn unbounded(mut self) -> Self {
        self.max_attempts = None;
        self
    }

    /// Set the delay schedule between attempts.
    ///
    /// Default: [`Backoff::default`]
    pub fn backoff(mut self, backoff: impl BackoffStrategy + 'static) -> Self {
        self.backoff = Arc::new(backoff);
        self
    }

    /// Set where and how attempts are scheduled.
    ///
    /// Default: [`TokioScheduler::default`]
    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Arc::new(scheduler);
        self
    }

    /// Apply the attempt budget and backoff from a [`RetryConfig`].
    pub fn config(self, config: RetryConfig) -> Self {
        let builder = self.backoff(config.backoff);
        match config.max_attempts {
            Some(max_attempts) => builder.max_attempts(max_attempts),
            None => builder.unbounded(),
        }
    }

    /// Build the unstarted controller.
    pub fn build(self) -> RetryController<T, E> {
        RetryController {
            inner: Arc::new(Inner {
                name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
                max_attempts: self.max_attempts,
                backoff: self.backoff,
                operation: self.operation,
                scheduler: self.scheduler,
                started: AtomicBool::new(false),
                iteration: AtomicU32::new(0),
                outcome: Arc::new(OutcomeSlot::new()),
            }),
        }
    }
}

/// Retry `operation` under `config` and wait for the outcome.
///
/// The controller is kept alive until the outcome resolves. With an
/// unbounded configuration this only returns once the operation succeeds.
///
/// # Examples
///
/// ```rust
/// use reattempt::config::RetryConfig;
/// use reattempt::retry::{retry, Backoff};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let calls = Arc::new(AtomicU32::new(0));
/// let config = RetryConfig::default()
///     .with_max_attempts(5)
///     .with_backoff(Backoff::linear(1.0, 0.0));
///
/// let counter = Arc::clone(&calls);
/// let value = retry(config, move || {
///     let counter = Arc::clone(&counter);
///     async move {
///         if counter.fetch_add(1, Ordering::SeqCst) < 2 {
///             Err("not yet")
///         } else {
///             Ok(42)
///         }
///     }
/// })
/// .await;
///
/// assert_eq!(value, Ok(42));
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # }
/// ```
pub async fn retry<T, E, F, Fut>(config: RetryConfig, operation: F) -> Result<T, RetryError>
where
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let controller = RetryController::builder(operation).config(config).build();
    controller.start();
    let result = controller.result().into_result().await;
    drop(controller);
    result
}
