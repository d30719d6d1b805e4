//! Example: Serializing tasks with in-memory locks
//!
//! Run with: `RUST_LOG=kv_lock_core=debug cargo run --example memory_lock`

use kv_lock_core::prelude::*;
use kv_lock_memory::MemoryLockStore;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let store = MemoryLockStore::new();
    let provider = KvLockProvider::new(store.clone());
    let lease = Duration::from_secs(5);

    // Try to acquire the lock
    match provider.try_lock("example-resource", lease).await? {
        Some(handle) => {
            println!("Lock acquired, token {}", handle.token());

            // Another worker sees it busy
            let busy = provider.try_lock("example-resource", lease).await?;
            println!("Second attempt acquired: {}", busy.is_some());

            let outcome = handle.unlock().await?;
            println!("Lock released: {}", outcome.as_str());
        }
        None => println!("Lock is currently held elsewhere"),
    }

    // Several workers taking turns
    let mut workers = Vec::new();
    for id in 0..4 {
        let provider = provider.clone();
        workers.push(tokio::spawn(async move {
            let handle = provider.lock("shared-counter", lease).await?;
            println!("Worker {id} in critical section");
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.release().await
        }));
    }
    for worker in workers {
        worker.await??;
    }

    // Bounded wait against a lock that stays held
    let held = provider.lock("report", lease).await?;
    let waited = provider
        .try_lock_for("report", lease, Duration::from_millis(300))
        .await?;
    println!("Bounded wait acquired: {}", waited.is_some());

    // Cancellable wait
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let waiter = {
        let provider = provider.clone();
        tokio::spawn(async move { provider.lock_interruptibly("report", lease, &cancel_rx).await })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel_tx.send(true)?;
    match waiter.await? {
        Err(LockError::Cancelled) => println!("Cancelled waiting for the report lock"),
        other => println!("Unexpected result: {other:?}"),
    }

    held.release().await?;
    println!("Entries left in store: {}", store.len());
    Ok(())
}
