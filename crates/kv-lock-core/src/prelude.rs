//! Convenience prelude for lock types.

pub use crate::backoff::BackoffOptions;
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::error::{LockError, LockResult};
pub use crate::handle::{KvLockHandle, ReleaseOutcome};
pub use crate::lock::KvDistributedLock;
pub use crate::options::KvLockOptions;
pub use crate::provider::{KvLockProvider, KvLockProviderBuilder};
pub use crate::token::OwnershipToken;
pub use crate::traits::{DistributedLock, LockHandle, LockProvider, LockProviderExt, LockStore};
