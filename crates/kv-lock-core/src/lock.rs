//! Key-value lock implementation.
//!
//! # Protocol
//!
//! Acquisition first tries `set_if_absent(key, now + lease)`. If the key is
//! taken, the stored expiry is read; an expired record is reclaimed with
//! `get_and_set`, and the reclaim counts only if the value it replaced is the
//! one just read. Release deletes the record only while it still holds the
//! caller's token.
//!
//! # Known limitation
//!
//! Reclamation is not a compare-and-swap. Two contenders that both read the
//! same stale token will both write a replacement; only the first sees the
//! stale value come back, but the loser's write still lands and overwrites
//! the winner's token. The winner keeps running its critical section while
//! the store holds the loser's token, so the winner's release becomes a
//! no-op and the record lingers until the loser's lease runs out. A
//! `get_and_set` that finds the key already deleted likewise leaves its
//! replacement behind. The stored expiry of both tokens is the same second,
//! so no third party can reclaim earlier than it could have anyway, but the
//! protocol does not provide fencing and must not be relied on where two
//! simultaneous holders would corrupt data.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::field::Empty;
use tracing::{Span, debug, instrument, warn};

use crate::backoff::{Backoff, random_pause};
use crate::clock::Clock;
use crate::error::{LockError, LockResult};
use crate::handle::{KvLockHandle, ReleaseOutcome};
use crate::options::{KvLockOptions, validate_key, validate_lease};
use crate::timeout::TimeoutValue;
use crate::token::OwnershipToken;
use crate::traits::{DistributedLock, LockStore};

/// Shared state behind a provider, its locks and their handles.
pub(crate) struct KvLockState<S> {
    pub(crate) store: S,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) options: KvLockOptions,
}

impl<S: LockStore> KvLockState<S> {
    pub(crate) fn new(store: S, clock: Arc<dyn Clock>, options: KvLockOptions) -> Self {
        Self {
            store,
            clock,
            options,
        }
    }

    fn now(&self) -> i64 {
        self.clock.now_epoch_secs()
    }

    /// Makes a single acquisition attempt.
    #[instrument(
        skip(self, key),
        fields(lock.key = %key, backend = "kv", operation = "try_acquire", acquired = Empty, reclaimed = Empty)
    )]
    pub(crate) async fn try_acquire(
        self: &Arc<Self>,
        key: &str,
        lease: Duration,
    ) -> LockResult<Option<KvLockHandle<S>>> {
        validate_key(key)?;
        validate_lease(lease)?;

        let candidate = OwnershipToken::for_lease(self.now(), lease);
        if self.store.set_if_absent(key, candidate.as_str()).await? {
            Span::current().record("acquired", true);
            debug!(token = %candidate, "lock acquired");
            return Ok(Some(KvLockHandle::new(self.clone(), key, candidate)));
        }

        let Some(current) = self.store.get(key).await? else {
            // Released between the two calls; the next attempt will see it free.
            Span::current().record("acquired", false);
            debug!("lock released while being inspected");
            return Ok(None);
        };
        let current = OwnershipToken::from_raw(current);

        if !current.is_expired_at(self.now()) {
            Span::current().record("acquired", false);
            debug!(holder_expires_at = ?current.expires_at(), "lock held");
            return Ok(None);
        }

        let replacement = OwnershipToken::for_lease(self.now(), lease);
        let previous = self.store.get_and_set(key, replacement.as_str()).await?;
        if previous.as_deref() == Some(current.as_str()) {
            Span::current().record("acquired", true);
            Span::current().record("reclaimed", true);
            debug!(stale = %current, token = %replacement, "stale lock reclaimed");
            return Ok(Some(KvLockHandle::new(self.clone(), key, replacement)));
        }

        Span::current().record("acquired", false);
        Span::current().record("reclaimed", false);
        debug!(
            stale = %current,
            previous = ?previous,
            "stale lock was reclaimed by another contender"
        );
        Ok(None)
    }

    /// Retries acquisition with backoff until it succeeds, `timeout` runs
    /// out (`LockError::Timeout`) or `cancel` reads `true`
    /// (`LockError::Cancelled`).
    ///
    /// The budget is checked after each attempt and sleeps never run past
    /// it, so the last attempt starts at or just after the deadline. An
    /// attempt in flight is never interrupted.
    #[instrument(
        skip(self, key, cancel),
        fields(lock.key = %key, backend = "kv", operation = "acquire", acquired = Empty, attempts = Empty, elapsed_ms = Empty)
    )]
    pub(crate) async fn acquire(
        self: &Arc<Self>,
        key: &str,
        lease: Duration,
        timeout: TimeoutValue,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> LockResult<KvLockHandle<S>> {
        validate_key(key)?;
        validate_lease(lease)?;

        let start = Instant::now();
        let mut backoff = Backoff::new(&self.options.backoff);
        let mut cancel = cancel.cloned();
        let mut attempts: u64 = 0;

        loop {
            if cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
                Span::current().record("acquired", false);
                Span::current().record("attempts", attempts);
                debug!("lock acquisition cancelled");
                return Err(LockError::Cancelled);
            }

            attempts += 1;
            if let Some(handle) = self.try_acquire(key, lease).await? {
                let elapsed = start.elapsed();
                Span::current().record("acquired", true);
                Span::current().record("attempts", attempts);
                Span::current().record("elapsed_ms", elapsed.as_millis() as u64);
                return Ok(handle);
            }

            let elapsed = start.elapsed();
            if timeout.is_exhausted(elapsed) {
                Span::current().record("acquired", false);
                Span::current().record("attempts", attempts);
                Span::current().record("elapsed_ms", elapsed.as_millis() as u64);
                return Err(LockError::Timeout(timeout.as_duration().unwrap_or_default()));
            }

            let delay = timeout.clamp_delay(backoff.next_delay(), elapsed);
            match cancel.as_mut() {
                Some(rx) => {
                    // A dropped sender disables the second branch instead of waking us.
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        Ok(()) = rx.changed() => {}
                    }
                }
                None => tokio::time::sleep(delay).await,
            }
        }
    }

    /// Deletes the record if it still holds `token`, then pauses for a
    /// random fraction of `release_jitter`.
    #[instrument(
        skip(self, key, token),
        fields(lock.key = %key, backend = "kv", operation = "release", outcome = Empty)
    )]
    pub(crate) async fn release(
        &self,
        key: &str,
        token: &OwnershipToken,
    ) -> LockResult<ReleaseOutcome> {
        validate_key(key)?;

        let outcome = match self.store.get(key).await? {
            Some(current) if *token == current => {
                self.store.delete(key).await?;
                if token.is_expired_at(self.now()) {
                    warn!(token = %token, "released a lock after its lease had run out");
                }
                debug!("lock released");
                ReleaseOutcome::Released
            }
            Some(current) => {
                debug!(current = %current, "lock was reset by another holder, nothing to release");
                ReleaseOutcome::Reclaimed
            }
            None => {
                debug!("lock not held, nothing to release");
                ReleaseOutcome::NotHeld
            }
        };
        Span::current().record("outcome", outcome.as_str());

        let pause = random_pause(self.options.release_jitter);
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        Ok(outcome)
    }
}

/// A lock bound to one key and one lease length.
///
/// Created by `KvLockProvider::create_lock`; the lease defaults to the
/// provider's `default_lease`.
pub struct KvDistributedLock<S> {
    state: Arc<KvLockState<S>>,
    name: String,
    lease: Duration,
}

impl<S: LockStore> KvDistributedLock<S> {
    pub(crate) fn new(state: Arc<KvLockState<S>>, name: String, lease: Duration) -> Self {
        Self { state, name, lease }
    }

    /// The lease written into each token this lock acquires.
    pub fn lease(&self) -> Duration {
        self.lease
    }

    /// Returns a copy of this lock with a different lease.
    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lease = lease;
        self
    }

    /// Waits for the lock until `cancel` reads `true`.
    pub async fn acquire_interruptibly(
        &self,
        cancel: &watch::Receiver<bool>,
    ) -> LockResult<KvLockHandle<S>> {
        self.state
            .acquire(&self.name, self.lease, TimeoutValue::INFINITE, Some(cancel))
            .await
    }
}

impl<S: LockStore> DistributedLock for KvDistributedLock<S> {
    type Handle = KvLockHandle<S>;

    fn name(&self) -> &str {
        &self.name
    }

    async fn acquire(&self, timeout: Option<Duration>) -> LockResult<Self::Handle> {
        self.state
            .acquire(&self.name, self.lease, TimeoutValue::from(timeout), None)
            .await
    }

    async fn try_acquire(&self) -> LockResult<Option<Self::Handle>> {
        self.state.try_acquire(&self.name, self.lease).await
    }
}
