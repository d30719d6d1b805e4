//! Key-value lock provider implementation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::backoff::BackoffOptions;
use crate::clock::{Clock, SystemClock};
use crate::error::{LockError, LockResult};
use crate::handle::{KvLockHandle, ReleaseOutcome};
use crate::lock::{KvDistributedLock, KvLockState};
use crate::options::KvLockOptions;
use crate::timeout::TimeoutValue;
use crate::token::OwnershipToken;
use crate::traits::{LockProvider, LockStore};

/// Builder for key-value lock provider configuration.
pub struct KvLockProviderBuilder<S> {
    store: Option<S>,
    clock: Option<Arc<dyn Clock>>,
    options: KvLockOptions,
}

impl<S: LockStore> KvLockProviderBuilder<S> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            store: None,
            clock: None,
            options: KvLockOptions::default(),
        }
    }

    /// Sets the store holding the lock records.
    pub fn store(mut self, store: S) -> Self {
        self.store = Some(store);
        self
    }

    /// Overrides the clock used to stamp and check tokens.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Sets the lease used by locks created through `create_lock`.
    pub fn default_lease(mut self, lease: Duration) -> Self {
        self.options.default_lease = lease;
        self
    }

    /// Sets the backoff between attempts in the waiting calls.
    pub fn backoff(mut self, backoff: BackoffOptions) -> Self {
        self.options.backoff = backoff;
        self
    }

    /// Sets the upper bound of the random pause after each release.
    ///
    /// `Duration::ZERO` disables the pause.
    pub fn release_jitter(mut self, jitter: Duration) -> Self {
        self.options.release_jitter = jitter;
        self
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: KvLockOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the provider.
    pub fn build(self) -> LockResult<KvLockProvider<S>> {
        let store = self
            .store
            .ok_or_else(|| LockError::InvalidArgument("no lock store provided".to_string()))?;
        self.options.validate()?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        Ok(KvLockProvider {
            state: Arc::new(KvLockState::new(store, clock, self.options)),
        })
    }
}

impl<S: LockStore> Default for KvLockProviderBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider for locks kept in a [`LockStore`].
///
/// Exposes the keyed lock operations directly and, through
/// [`LockProvider`], named locks that use the default lease. Cloning is
/// cheap; clones share the store.
///
/// # Example
///
/// ```rust,ignore
/// let provider = KvLockProvider::new(store);
///
/// if let Some(handle) = provider.try_lock("job", Duration::from_secs(5)).await? {
///     run_job().await;
///     handle.unlock().await?;
/// }
/// ```
pub struct KvLockProvider<S> {
    state: Arc<KvLockState<S>>,
}

impl<S> Clone for KvLockProvider<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<S: LockStore> KvLockProvider<S> {
    /// Returns a new builder for configuring the provider.
    pub fn builder() -> KvLockProviderBuilder<S> {
        KvLockProviderBuilder::new()
    }

    /// Creates a provider over `store` with default options.
    pub fn new(store: S) -> Self {
        Self {
            state: Arc::new(KvLockState::new(
                store,
                Arc::new(SystemClock),
                KvLockOptions::default(),
            )),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.state.store
    }

    /// The options this provider was built with.
    pub fn options(&self) -> &KvLockOptions {
        &self.state.options
    }

    /// Attempts to take the lock once.
    ///
    /// Returns `Ok(None)` if another caller holds a live lease.
    pub async fn try_lock(&self, key: &str, lease: Duration) -> LockResult<Option<KvLockHandle<S>>> {
        self.state.try_acquire(key, lease).await
    }

    /// Retries until the lock is taken or `wait` has elapsed.
    ///
    /// `Ok(None)` is returned no earlier than `wait` after the call started.
    /// A zero `wait` makes exactly one attempt.
    pub async fn try_lock_for(
        &self,
        key: &str,
        lease: Duration,
        wait: Duration,
    ) -> LockResult<Option<KvLockHandle<S>>> {
        match self
            .state
            .acquire(key, lease, TimeoutValue::from(wait), None)
            .await
        {
            Ok(handle) => Ok(Some(handle)),
            Err(LockError::Timeout(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Retries until the lock is taken.
    pub async fn lock(&self, key: &str, lease: Duration) -> LockResult<KvLockHandle<S>> {
        self.state
            .acquire(key, lease, TimeoutValue::INFINITE, None)
            .await
    }

    /// Retries until the lock is taken or `cancel` reads `true`.
    ///
    /// The signal is checked before every attempt and wakes the backoff
    /// sleep, so cancellation takes effect as soon as the store call in
    /// flight (if any) returns.
    pub async fn lock_interruptibly(
        &self,
        key: &str,
        lease: Duration,
        cancel: &watch::Receiver<bool>,
    ) -> LockResult<KvLockHandle<S>> {
        self.state
            .acquire(key, lease, TimeoutValue::INFINITE, Some(cancel))
            .await
    }

    /// Releases `key` if the store still holds `token`.
    ///
    /// Safe to repeat: once the record is gone or owned by someone else this
    /// is a no-op reporting `NotHeld` or `Reclaimed`.
    pub async fn unlock(&self, key: &str, token: &OwnershipToken) -> LockResult<ReleaseOutcome> {
        self.state.release(key, token).await
    }

    /// Creates a named lock with its own lease.
    pub fn create_lock_with_lease(&self, name: &str, lease: Duration) -> KvDistributedLock<S> {
        KvDistributedLock::new(self.state.clone(), name.to_string(), lease)
    }
}

impl<S: LockStore> LockProvider for KvLockProvider<S> {
    type Lock = KvDistributedLock<S>;

    fn create_lock(&self, name: &str) -> Self::Lock {
        self.create_lock_with_lease(name, self.state.options.default_lease)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::test_store::MapStore;
    use crate::traits::{DistributedLock, LockHandle, LockProviderExt};

    const LEASE: Duration = Duration::from_secs(5);

    fn provider(store: MapStore, clock: &ManualClock) -> KvLockProvider<MapStore> {
        KvLockProvider::builder()
            .store(store)
            .clock(clock.clone())
            .release_jitter(Duration::ZERO)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_store() {
        let result = KvLockProviderBuilder::<MapStore>::new().build();
        assert!(matches!(result, Err(LockError::InvalidArgument(_))));
    }

    #[test]
    fn test_builder_rejects_sub_second_default_lease() {
        let result = KvLockProvider::builder()
            .store(MapStore::default())
            .default_lease(Duration::from_millis(10))
            .build();
        assert!(matches!(result, Err(LockError::InvalidArgument(_))));
    }

    #[test]
    fn test_builder_rejects_unbounded_backoff() {
        let result = KvLockProvider::builder()
            .store(MapStore::default())
            .backoff(BackoffOptions {
                initial: Duration::MAX,
                max: Duration::MAX,
                multiplier: 2,
                jitter: 0.25,
            })
            .build();
        assert!(matches!(result, Err(LockError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_unlock_twice_is_noop() {
        let clock = ManualClock::new(1_000);
        let store = MapStore::default();
        let provider = provider(store.clone(), &clock);

        let token = provider
            .try_lock("job", LEASE)
            .await
            .unwrap()
            .unwrap()
            .into_token();
        assert_eq!(
            provider.unlock("job", &token).await.unwrap(),
            ReleaseOutcome::Released
        );
        assert_eq!(
            provider.unlock("job", &token).await.unwrap(),
            ReleaseOutcome::NotHeld
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_named_lock_uses_default_lease() {
        let clock = ManualClock::new(1_000);
        let provider = provider(MapStore::default(), &clock);

        let lock = provider.create_lock("report");
        assert_eq!(lock.name(), "report");
        assert_eq!(lock.lease(), Duration::from_secs(30));

        let handle = lock.try_acquire().await.unwrap().unwrap();
        assert_eq!(handle.expires_at(), Some(1_030));
        assert!(lock.try_acquire().await.unwrap().is_none());
        handle.release().await.unwrap();
        assert!(lock.try_acquire().await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_named_lock_acquire_times_out() {
        let clock = ManualClock::new(1_000);
        let provider = provider(MapStore::default(), &clock);

        let _held = provider.try_acquire_lock("report").await.unwrap().unwrap();
        let result = provider
            .acquire_lock("report", Some(Duration::from_millis(100)))
            .await;
        assert!(matches!(result, Err(LockError::Timeout(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interruptible_lock_cancels_while_waiting() {
        let clock = ManualClock::new(1_000);
        let provider = provider(MapStore::default(), &clock);
        let _held = provider.try_lock("job", LEASE).await.unwrap().unwrap();

        let (tx, rx) = watch::channel(false);
        let waiter = {
            let provider = provider.clone();
            tokio::spawn(async move { provider.lock_interruptibly("job", LEASE, &rx).await })
        };

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!waiter.is_finished());
        tx.send(true).unwrap();

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(LockError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_named_lock_acquire_interruptibly() {
        let clock = ManualClock::new(1_000);
        let provider = provider(MapStore::default(), &clock);
        let (_tx, rx) = watch::channel(false);

        let handle = provider
            .create_lock_with_lease("job", LEASE)
            .acquire_interruptibly(&rx)
            .await
            .unwrap();
        assert_eq!(handle.expires_at(), Some(1_005));
    }
}
