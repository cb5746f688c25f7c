//! Common test utilities and helpers

use reattempt::scheduler::{Scheduler, Task, TokioScheduler};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scheduler that records every requested delay before delegating to tokio.
#[derive(Debug, Clone, Default)]
pub struct RecordingScheduler {
    inner: TokioScheduler,
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingScheduler {
    /// Delays requested so far, in scheduling order.
    #[allow(dead_code)]
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Scheduler for RecordingScheduler {
    fn after(&self, delay: Duration, task: Task) {
        self.delays.lock().unwrap().push(delay);
        self.inner.after(delay, task);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestError(pub u32);

/// An operation that fails its first `failures` invocations, then succeeds
/// with the invocation index. Returns the operation and its call counter.
#[allow(dead_code)]
pub fn flaky(
    failures: u32,
) -> (
    impl Fn() -> std::future::Ready<Result<u32, TestError>> + Send + Sync + 'static,
    Arc<AtomicU32>,
) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let operation = move || {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        if call < failures {
            std::future::ready(Err(TestError(call)))
        } else {
            std::future::ready(Ok(call))
        }
    };
    (operation, calls)
}

/// An operation that sleeps for `latency` before resolving with `result`.
#[allow(dead_code)]
pub fn slow<T>(
    latency: Duration,
    result: Result<T, TestError>,
) -> (
    impl Fn() -> std::pin::Pin<Box<dyn Future<Output = Result<T, TestError>> + Send>>
    + Send
    + Sync
    + 'static,
    Arc<AtomicU32>,
)
where
    T: Clone + Send + Sync + 'static,
{
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let operation = move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let result = result.clone();
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            result
        }) as std::pin::Pin<Box<dyn Future<Output = Result<T, TestError>> + Send>>
    };
    (operation, calls)
}

/// Current call count of a counter returned by [`flaky`] or [`slow`].
#[allow(dead_code)]
pub fn count(calls: &Arc<AtomicU32>) -> u32 {
    calls.load(Ordering::SeqCst)
}
