//! Error types for lock operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during lock operations.
///
/// Contention is not an error: a busy lock is reported as `Ok(None)` by the
/// non-blocking and bounded acquisition calls.
#[derive(Error, Debug)]
pub enum LockError {
    /// Lock acquisition timed out.
    #[error("lock acquisition timed out after {0:?}")]
    Timeout(Duration),

    /// Lock operation was cancelled.
    #[error("lock operation was cancelled")]
    Cancelled,

    /// The store could not be reached.
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Invalid lock key.
    #[error("invalid lock name: {0}")]
    InvalidName(String),

    /// Invalid lease, timeout or configuration value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A store command failed.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LockError {
    /// Wraps a store command failure.
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }

    /// Wraps a store connectivity failure.
    pub fn connection(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Connection(err.into())
    }
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_keeps_source() {
        let err = LockError::backend(std::io::Error::other("GETSET failed"));
        assert_eq!(err.to_string(), "backend error: GETSET failed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_connection_error_from_string() {
        let err = LockError::connection("refused");
        assert!(matches!(err, LockError::Connection(_)));
        assert_eq!(err.to_string(), "connection error: refused");
    }
}
