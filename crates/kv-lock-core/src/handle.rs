//! Lock handle implementation.

use std::fmt;
use std::sync::Arc;

use crate::error::LockResult;
use crate::lock::KvLockState;
use crate::token::OwnershipToken;
use crate::traits::{LockHandle, LockStore};

/// What a release call found in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The record held our token and was deleted.
    Released,
    /// No record existed.
    NotHeld,
    /// The record held another token: our lease ran out and someone else
    /// reclaimed the lock. Nothing was deleted.
    Reclaimed,
}

impl ReleaseOutcome {
    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Released => "released",
            Self::NotHeld => "not_held",
            Self::Reclaimed => "reclaimed",
        }
    }
}

/// Handle for a held lock.
///
/// Owns the token written at acquisition; the token never leaves the handle
/// unless the caller takes it with [`KvLockHandle::into_token`], in which
/// case `KvLockProvider::unlock` releases it later.
///
/// Dropping the handle does not release the lock (release needs the store);
/// the record then stays until the lease runs out and another caller
/// reclaims it.
pub struct KvLockHandle<S> {
    state: Arc<KvLockState<S>>,
    key: String,
    token: OwnershipToken,
}

impl<S: LockStore> KvLockHandle<S> {
    pub(crate) fn new(state: Arc<KvLockState<S>>, key: &str, token: OwnershipToken) -> Self {
        Self {
            state,
            key: key.to_string(),
            token,
        }
    }

    /// The token written under the lock key.
    pub fn token(&self) -> &OwnershipToken {
        &self.token
    }

    /// Epoch second at which the lease runs out.
    pub fn expires_at(&self) -> Option<i64> {
        self.token.expires_at()
    }

    /// Whether the lease has run out, so another caller may reclaim the lock.
    pub fn is_expired(&self) -> bool {
        self.token.is_expired_at(self.state.clock.now_epoch_secs())
    }

    /// Releases the lock and reports what the store held.
    pub async fn unlock(self) -> LockResult<ReleaseOutcome> {
        self.state.release(&self.key, &self.token).await
    }

    /// Gives up the handle, keeping only the token.
    pub fn into_token(self) -> OwnershipToken {
        self.token
    }
}

impl<S> fmt::Debug for KvLockHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvLockHandle")
            .field("key", &self.key)
            .field("token", &self.token)
            .finish()
    }
}

impl<S: LockStore> LockHandle for KvLockHandle<S> {
    fn key(&self) -> &str {
        &self.key
    }

    async fn release(self) -> LockResult<()> {
        self.unlock().await.map(|_| ())
    }
}
