//! Ownership tokens: the values stored under a lock key.

use std::fmt;
use std::time::Duration;

/// Proof of lock ownership.
///
/// The token is the decimal epoch second at which the lease runs out. The
/// same string is written under the lock key and kept by the holder, so
/// release can tell whether the record still belongs to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnershipToken(String);

impl OwnershipToken {
    /// Builds the token for a lease starting at `now_epoch_secs`.
    pub fn for_lease(now_epoch_secs: i64, lease: Duration) -> Self {
        let lease_secs = i64::try_from(lease.as_secs()).unwrap_or(i64::MAX);
        let expires_at = now_epoch_secs.saturating_add(lease_secs);
        Self(expires_at.to_string())
    }

    /// Wraps a raw value read back from the store.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The encoded expiry, or `None` if the value is not an integer.
    pub fn expires_at(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// Whether the lease ended strictly before `now_epoch_secs`.
    ///
    /// Unparsable values are never considered expired.
    pub fn is_expired_at(&self, now_epoch_secs: i64) -> bool {
        matches!(self.expires_at(), Some(expires_at) if expires_at < now_epoch_secs)
    }
}

impl fmt::Display for OwnershipToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OwnershipToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for OwnershipToken {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<String> for OwnershipToken {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}
