//! Core traits for key-value backed locks.

use std::future::Future;
use std::time::Duration;

use crate::error::LockResult;

// ============================================================================
// Lock Store Trait
// ============================================================================

/// The narrow set of store primitives the lock algorithm relies on.
///
/// Each operation must be atomic (linearizable) on its own; the algorithm
/// composes them and never needs multi-key transactions. Store-side key
/// expiry is not used: the lease deadline lives in the stored value.
///
/// The namespace is shared with whatever else the store holds, so lock keys
/// should be chosen not to collide with ordinary cache entries.
pub trait LockStore: Send + Sync + 'static {
    /// Creates `key` with `value` only if it is absent. Returns `true` if the
    /// entry was created.
    fn set_if_absent(&self, key: &str, value: &str)
    -> impl Future<Output = LockResult<bool>> + Send;

    /// Reads the current value of `key`.
    fn get(&self, key: &str) -> impl Future<Output = LockResult<Option<String>>> + Send;

    /// Atomically replaces the value of `key`, returning the previous value
    /// (`None` if the key did not exist).
    fn get_and_set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = LockResult<Option<String>>> + Send;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = LockResult<()>> + Send;
}

// ============================================================================
// Lock Handle Trait
// ============================================================================

/// Handle to a held lock.
///
/// The handle carries the ownership token granted at acquisition. Dropping
/// it without calling `release()` leaves the record in the store until its
/// lease runs out and another caller reclaims it.
///
/// # Example
///
/// ```rust,ignore
/// let handle = lock.acquire(None).await?;
/// // Critical section - we hold the lock
/// do_work().await;
/// handle.release().await?;
/// ```
pub trait LockHandle: Send + Sync + Sized {
    /// The lock key this handle owns.
    fn key(&self) -> &str;

    /// Releases the lock if the store still holds this handle's token.
    fn release(self) -> impl Future<Output = LockResult<()>> + Send;
}

// ============================================================================
// Distributed Lock Trait
// ============================================================================

/// A named mutual exclusion lock.
///
/// # Example
///
/// ```rust,ignore
/// use kv_lock_core::DistributedLock;
///
/// async fn protected_operation(lock: &impl DistributedLock) -> Result<(), Error> {
///     // Acquire with 5 second timeout
///     let handle = lock.acquire(Some(Duration::from_secs(5))).await?;
///
///     perform_critical_section().await?;
///
///     handle.release().await?;
///     Ok(())
/// }
/// ```
pub trait DistributedLock: Send + Sync {
    /// The handle type returned when the lock is acquired.
    type Handle: LockHandle + Send;

    /// Returns the key identifying this lock.
    fn name(&self) -> &str;

    /// Acquires the lock, waiting up to `timeout`.
    ///
    /// # Returns
    ///
    /// * `Ok(handle)` - Lock acquired successfully
    /// * `Err(LockError::Timeout)` - Timeout expired before lock acquired
    /// * `Err(LockError::Connection)` / `Err(LockError::Backend)` - Store failure
    ///
    /// Dropping the returned future stops the wait between store calls.
    fn acquire(
        &self,
        timeout: Option<Duration>,
    ) -> impl Future<Output = LockResult<Self::Handle>> + Send;

    /// Attempts to acquire the lock without waiting.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(handle))` - Lock acquired successfully
    /// * `Ok(None)` - Lock is held by someone else
    /// * `Err(...)` - Store failure
    fn try_acquire(&self) -> impl Future<Output = LockResult<Option<Self::Handle>>> + Send;
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Factory for creating locks by name.
///
/// # Example
///
/// ```rust,ignore
/// let provider = KvLockProvider::builder().store(store).build()?;
///
/// let lock = provider.create_lock("my-resource");
/// let handle = lock.acquire(None).await?;
/// ```
pub trait LockProvider: Send + Sync {
    /// The lock type created by this provider.
    type Lock: DistributedLock;

    /// Creates a lock with the given name.
    fn create_lock(&self, name: &str) -> Self::Lock;
}

// ============================================================================
// Convenience Extensions
// ============================================================================

/// Extension trait providing convenience methods for lock providers.
pub trait LockProviderExt: LockProvider {
    /// Acquires a lock by name, returning the handle.
    fn acquire_lock(
        &self,
        name: &str,
        timeout: Option<Duration>,
    ) -> impl Future<Output = LockResult<<Self::Lock as DistributedLock>::Handle>> + Send
    where
        Self: Sync,
    {
        async move {
            let lock = self.create_lock(name);
            lock.acquire(timeout).await
        }
    }

    /// Tries to acquire a lock by name.
    fn try_acquire_lock(
        &self,
        name: &str,
    ) -> impl Future<Output = LockResult<Option<<Self::Lock as DistributedLock>::Handle>>> + Send
    where
        Self: Sync,
    {
        async move {
            let lock = self.create_lock(name);
            lock.try_acquire().await
        }
    }
}

impl<T: LockProvider> LockProviderExt for T {}
