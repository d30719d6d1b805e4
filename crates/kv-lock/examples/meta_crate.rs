//! Example: Using the meta-crate (all backends)
//!
//! Run with: `cargo run --example meta_crate`
//!
//! This example shows how to use the meta-crate which re-exports
//! all backend implementations.

use kv_lock::*;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Example: Using kv-lock meta-crate\n");

    // Memory backend example
    println!("=== Memory Backend ===");
    let memory_provider = KvLockProvider::new(MemoryLockStore::new());

    let memory_lock = memory_provider.create_lock("example");
    if let Some(handle) = memory_lock.try_acquire().await? {
        println!("Memory lock acquired");
        handle.release().await?;
    }

    // Redis backend example (if available)
    if let Ok(redis_url) = std::env::var("REDIS_URL") {
        println!("\n=== Redis Backend ===");
        if let Ok(redis_provider) = RedisLockStore::builder()
            .url(&redis_url)
            .build_provider()
            .await
        {
            let redis_lock = redis_provider.create_lock("example");
            if let Some(handle) = redis_lock.try_acquire().await? {
                println!("Redis lock acquired");
                handle.release().await?;
            }
            let _ = redis_provider.store().quit().await;
        }
    }

    // Any provider works with backend-agnostic code
    async fn with_lock<P: LockProvider>(provider: &P) -> LockResult<bool> {
        let handle = provider.create_lock("agnostic").acquire(Some(Duration::from_secs(1))).await?;
        handle.release().await?;
        Ok(true)
    }
    println!("\nBackend-agnostic acquire: {}", with_lock(&memory_provider).await?);

    println!("\nAll examples completed!");
    Ok(())
}
