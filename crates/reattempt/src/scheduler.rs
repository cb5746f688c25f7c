//! Delayed execution of retry continuations.
//!
//! The controller never spawns work on its own; it hands every continuation
//! to a [`Scheduler`] together with the delay to wait first.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::runtime::Handle;

/// A unit of work handed to a [`Scheduler`].
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A facility that runs a task after a delay on some execution context.
///
/// Implementations decide where the task runs (a tokio runtime, a dedicated
/// thread, a test harness). A zero delay should run the task as soon as the
/// context allows.
pub trait Scheduler: Debug + Send + Sync {
    /// Run `task` once `delay` has elapsed.
    fn after(&self, delay: Duration, task: Task);
}

impl<S: Scheduler + ?Sized> Scheduler for std::sync::Arc<S> {
    fn after(&self, delay: Duration, task: Task) {
        (**self).after(delay, task)
    }
}

/// Schedules tasks on a tokio runtime using `tokio::time::sleep`.
///
/// The default instance spawns onto whichever runtime is current when
/// [`Scheduler::after`] is called, and panics if there is none. Use
/// [`TokioScheduler::with_handle`] to pin tasks to a specific runtime.
///
/// # Examples
///
/// ```rust
/// use reattempt::scheduler::TokioScheduler;
///
/// # #[tokio::main]
/// # async fn main() {
/// let shared = TokioScheduler::default();
/// let pinned = TokioScheduler::with_handle(tokio::runtime::Handle::current());
/// # let _ = (shared, pinned);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    handle: Option<Handle>,
}

impl TokioScheduler {
    /// Scheduler that always spawns onto the given runtime.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Scheduler pinned to the runtime of the calling context, if any.
    ///
    /// Falls back to the default behaviour outside a runtime.
    pub fn current() -> Self {
        Self {
            handle: Handle::try_current().ok(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, task: Task) {
        let delayed = async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            task.await;
        };
        match &self.handle {
            Some(handle) => {
                handle.spawn(delayed);
            }
            None => {
                tokio::spawn(delayed);
            }
        }
    }
}
