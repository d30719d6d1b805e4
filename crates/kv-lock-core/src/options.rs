//! Provider-wide settings and argument checks shared by the lock operations.

use std::time::Duration;

use crate::backoff::BackoffOptions;
use crate::error::{LockError, LockResult};

/// Tuning knobs shared by every lock created from one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct KvLockOptions {
    /// Lease used by locks created through `LockProvider::create_lock`.
    pub default_lease: Duration,
    /// Pacing between attempts in the waiting acquisition calls.
    pub backoff: BackoffOptions,
    /// Upper bound of the random pause taken after every release.
    pub release_jitter: Duration,
}

impl Default for KvLockOptions {
    fn default() -> Self {
        Self {
            default_lease: Duration::from_secs(30),
            backoff: BackoffOptions::default(),
            release_jitter: Duration::from_millis(100),
        }
    }
}

impl KvLockOptions {
    pub(crate) fn validate(&self) -> LockResult<()> {
        validate_lease(self.default_lease)?;
        self.backoff.validate()
    }
}

/// Rejects keys the store could not address.
pub(crate) fn validate_key(key: &str) -> LockResult<()> {
    if key.is_empty() {
        return Err(LockError::InvalidName("lock key cannot be empty".to_string()));
    }
    Ok(())
}

/// Tokens have second granularity, so a lease must cover at least one second
/// and fit in a signed epoch offset.
pub(crate) fn validate_lease(lease: Duration) -> LockResult<()> {
    if lease.as_secs() == 0 {
        return Err(LockError::InvalidArgument(format!(
            "lease must be at least one second, got {lease:?}"
        )));
    }
    if i64::try_from(lease.as_secs()).is_err() {
        return Err(LockError::InvalidArgument(format!(
            "lease of {} seconds is too long",
            lease.as_secs()
        )));
    }
    Ok(())
}
