//! Example: Using RetryController to wrap an unreliable operation
//!
//! This example demonstrates:
//! 1. Retrying until success with linear backoff
//! 2. Exhausting a bounded attempt budget with exponential backoff
//! 3. Abandoning a sequence by dropping the controller
//!
//! Run with:
//! ```bash
//! RUST_LOG=reattempt=debug cargo run -p reattempt --example retry_example
//! ```

use reattempt::prelude::*;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// A simulated API that fails the first few times
#[derive(Clone)]
struct UnreliableApi {
    attempts: Arc<AtomicU32>,
    fail_count: u32,
}

impl UnreliableApi {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: Arc::new(AtomicU32::new(0)),
            fail_count,
        }
    }

    async fn call(&self) -> Result<String, std::io::Error> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.fail_count {
            println!(
                "  Attempt {}: FAILED (simulating transient error)",
                attempt + 1
            );
            Err(std::io::Error::other(format!(
                "Transient error on attempt {}",
                attempt + 1
            )))
        } else {
            println!("  Attempt {}: SUCCESS", attempt + 1);
            Ok("API response data".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

fn controller_for(api: &UnreliableApi) -> RetryControllerBuilder<String, std::io::Error> {
    let api = api.clone();
    RetryController::builder(move || {
        let api = api.clone();
        async move { api.call().await }
    })
}

/// Example 1: Retry until success with linear backoff
async fn example_until_success() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Retry Until Success (Linear Backoff) ===\n");

    let api = UnreliableApi::new(2);
    let controller = controller_for(&api)
        .name("until-success")
        .backoff(Backoff::linear(0.1, 0.1))
        .build();

    println!("Calling unreliable API (will fail 2 times before succeeding)...");
    let start = Instant::now();
    controller.start();
    let result = controller.result().into_result().await?;

    println!("\nResult: {}", result);
    println!("Total attempts: {}", api.total_attempts());
    println!("Total time: {:?}", start.elapsed());
    println!("Expected delays: 0ms (attempt 1) + 100ms + 200ms = ~300ms");

    Ok(())
}

/// Example 2: Exhausting a bounded budget
async fn example_exhaustion() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Exhausting Max Attempts (Exponential Backoff) ===\n");

    let api = UnreliableApi::new(u32::MAX);
    let controller = controller_for(&api)
        .name("exhaustion")
        .max_attempts(4)
        .backoff(Backoff::exponential(0.05, 2))
        .build();

    controller.start();
    match controller.result().into_result().await {
        Ok(value) => println!("Unexpected success: {}", value),
        Err(RetryError::ExceededMaxAttempts { attempt_count }) => {
            println!("\nGave up after {} attempts", attempt_count);
        }
    }
    println!("Expected delays: 0ms + 50ms + 100ms + 200ms");

    Ok(())
}

/// Example 3: Dropping the controller abandons pending attempts
async fn example_abandon() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Abandoning a Retry Sequence ===\n");

    let api = UnreliableApi::new(u32::MAX);
    let controller = controller_for(&api)
        .name("abandoned")
        .backoff(Backoff::linear(0.2, 0.0))
        .build();
    let outcome = controller.result();

    controller.start();
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("Dropping controller after {} attempt(s)", api.total_attempts());
    drop(controller);

    tokio::time::sleep(Duration::from_millis(500)).await;
    println!(
        "Attempts after drop: {}, outcome resolved: {}",
        api.total_attempts(),
        outcome.is_resolved()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("==============================================");
    println!("   reattempt: Retry Controller Examples");
    println!("==============================================");

    example_until_success().await?;
    example_exhaustion().await?;
    example_abandon().await?;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}
