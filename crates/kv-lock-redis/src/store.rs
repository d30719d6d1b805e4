//! Redis implementation of the lock store primitives.

use fred::error::RedisErrorKind;
use fred::prelude::*;
use kv_lock_core::error::{LockError, LockResult};
use kv_lock_core::traits::LockStore;
use tracing::trace;

/// Lock store backed by a single Redis server.
///
/// Maps the primitives onto `SET NX`, `GET`, `GETSET` and `DEL`. Keys are
/// written as given unless a prefix was configured, so locks share the
/// database namespace with ordinary cache entries.
#[derive(Clone)]
pub struct RedisLockStore {
    client: RedisClient,
    key_prefix: Option<String>,
}

impl RedisLockStore {
    pub(crate) fn new(client: RedisClient, key_prefix: Option<String>) -> Self {
        Self { client, key_prefix }
    }

    /// The underlying client.
    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    /// The Redis key a lock key is stored under.
    pub fn redis_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{prefix}{key}"),
            None => key.to_string(),
        }
    }

    /// Closes the connection.
    pub async fn quit(&self) -> LockResult<()> {
        self.client
            .quit()
            .await
            .map_err(|e| command_error("QUIT", e))
    }
}

impl std::fmt::Debug for RedisLockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisLockStore")
            .field("client", &self.client.id())
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

/// Maps a client error onto the lock error taxonomy.
///
/// Transport failures become `Connection`; anything the server rejected
/// becomes `Backend`.
pub(crate) fn command_error(command: &str, e: RedisError) -> LockError {
    let message = format!("Redis {command} failed: {e}");
    match e.kind() {
        RedisErrorKind::IO | RedisErrorKind::Timeout | RedisErrorKind::Canceled => {
            LockError::Connection(Box::new(std::io::Error::other(message)))
        }
        _ => LockError::Backend(Box::new(std::io::Error::other(message))),
    }
}

impl LockStore for RedisLockStore {
    async fn set_if_absent(&self, key: &str, value: &str) -> LockResult<bool> {
        let redis_key = self.redis_key(key);
        // SET NX replies OK when the key was created and nil when it already existed.
        let result: Option<String> = self
            .client
            .set(&redis_key, value, None, Some(SetOptions::NX), false)
            .await
            .map_err(|e| command_error("SET NX", e))?;
        trace!(key = %redis_key, created = result.is_some(), "SET NX");
        Ok(result.is_some())
    }

    async fn get(&self, key: &str) -> LockResult<Option<String>> {
        let redis_key = self.redis_key(key);
        let value: Option<String> = self
            .client
            .get(&redis_key)
            .await
            .map_err(|e| command_error("GET", e))?;
        trace!(key = %redis_key, value = ?value, "GET");
        Ok(value)
    }

    async fn get_and_set(&self, key: &str, value: &str) -> LockResult<Option<String>> {
        let redis_key = self.redis_key(key);
        let previous: Option<String> = self
            .client
            .getset(&redis_key, value)
            .await
            .map_err(|e| command_error("GETSET", e))?;
        trace!(key = %redis_key, previous = ?previous, "GETSET");
        Ok(previous)
    }

    async fn delete(&self, key: &str) -> LockResult<()> {
        let redis_key = self.redis_key(key);
        let _: i64 = self
            .client
            .del(&redis_key)
            .await
            .map_err(|e| command_error("DEL", e))?;
        trace!(key = %redis_key, "DEL");
        Ok(())
    }
}
