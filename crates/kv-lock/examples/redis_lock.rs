//! Example: Using Redis-backed locks
//!
//! Run with: `cargo run --example redis_lock`
//!
//! Requires a Redis server. Set REDIS_URL environment variable
//! or modify the URL below.

use kv_lock_core::prelude::*;
use kv_lock_redis::RedisLockStore;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Get Redis URL from environment or use default
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

    println!("Connecting to Redis...");
    let store = RedisLockStore::builder().url(&redis_url).build().await?;
    let provider = KvLockProvider::builder()
        .store(store)
        .default_lease(Duration::from_secs(30))
        .build()?;

    // Create a lock by name
    let lock = provider.create_lock("example-resource");
    println!("Created lock: {}", lock.name());

    // Acquire the lock with a timeout
    println!("Acquiring lock with 5 second timeout...");
    let handle = lock.acquire(Some(Duration::from_secs(5))).await?;
    println!("Lock acquired until epoch second {:?}", handle.expires_at());

    // The lease is not renewed: keep the work well inside it
    println!("Doing work...");
    tokio::time::sleep(Duration::from_secs(2)).await;
    println!("Work completed");

    handle.release().await?;
    println!("Lock released");

    Ok(())
}
