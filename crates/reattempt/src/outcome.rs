//! Single-resolution outcome of a retry sequence.
//!
//! [`OutcomeSlot`] is written at most once by the controller; [`Outcome`] is
//! the read-only handle handed to observers. Once resolved the value never
//! changes, and later resolution attempts are ignored.

use crate::error::RetryError;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Notify, OnceCell};

/// Write-once storage for the terminal result of a retry sequence.
pub(crate) struct OutcomeSlot<T> {
    value: OnceCell<Result<T, RetryError>>,
    resolved: Notify,
}

impl<T> OutcomeSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            value: OnceCell::new(),
            resolved: Notify::new(),
        }
    }

    /// Store `result` if nothing has been stored yet.
    ///
    /// Returns `true` for the call that resolved the slot and `false` for
    /// every later call, whose value is dropped.
    pub(crate) fn resolve(&self, result: Result<T, RetryError>) -> bool {
        if self.value.set(result).is_err() {
            return false;
        }
        self.resolved.notify_waiters();
        true
    }

    pub(crate) fn get(&self) -> Option<&Result<T, RetryError>> {
        self.value.get()
    }
}

/// Handle to the eventual result of a [`RetryController`](crate::retry::RetryController).
///
/// Cheap to clone; every clone observes the same single resolution. The
/// handle does not keep the controller alive: if every controller handle is
/// dropped before the sequence finishes, the outcome stays unresolved.
///
/// # Examples
///
/// ```rust
/// use reattempt::retry::RetryController;
///
/// # #[tokio::main]
/// # async fn main() {
/// let controller = RetryController::new(|| async { Ok::<_, std::io::Error>(7) });
/// controller.start();
///
/// let outcome = controller.result();
/// assert_eq!(outcome.wait().await, &Ok(7));
/// # }
/// ```
pub struct Outcome<T> {
    slot: Arc<OutcomeSlot<T>>,
}

impl<T> Outcome<T> {
    pub(crate) fn new(slot: Arc<OutcomeSlot<T>>) -> Self {
        Self { slot }
    }

    /// Wait until the outcome is resolved and borrow it.
    pub async fn wait(&self) -> &Result<T, RetryError> {
        loop {
            let notified = self.slot.resolved.notified();
            tokio::pin!(notified);
            // Register before checking so a resolution in between still wakes us.
            notified.as_mut().enable();

            if let Some(result) = self.slot.get() {
                return result;
            }
            notified.await;
        }
    }

    /// The outcome if it has already been resolved.
    pub fn get(&self) -> Option<&Result<T, RetryError>> {
        self.slot.get()
    }

    /// Whether the outcome has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<T: Clone> Outcome<T> {
    /// Wait for the outcome and return an owned copy of it.
    pub async fn into_result(self) -> Result<T, RetryError> {
        let result = self.wait().await;
        result.clone()
    }
}

impl<T> Clone for Outcome<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("value", &self.slot.get())
            .finish()
    }
}
