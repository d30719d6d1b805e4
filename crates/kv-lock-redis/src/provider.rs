//! Redis store construction.

use fred::prelude::*;
use kv_lock_core::error::{LockError, LockResult};
use kv_lock_core::provider::KvLockProvider;

use crate::store::RedisLockStore;

/// A lock provider whose records live in Redis.
pub type RedisLockProvider = KvLockProvider<RedisLockStore>;

/// Builder for a Redis lock store.
pub struct RedisLockStoreBuilder {
    url: Option<String>,
    client: Option<RedisClient>,
    key_prefix: Option<String>,
}

impl RedisLockStoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: None,
            client: None,
            key_prefix: None,
        }
    }

    /// Sets the Redis server URL to connect to.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Uses an existing (already connected) Redis client.
    pub fn client(mut self, client: RedisClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Prepends `prefix` to every lock key.
    ///
    /// Without a prefix, lock keys share the namespace with everything else
    /// in the database.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Builds the store, connecting first when a URL was given.
    pub async fn build(self) -> LockResult<RedisLockStore> {
        let client = match (self.client, self.url) {
            (Some(client), _) => client,
            (None, Some(url)) => connect(&url).await?,
            (None, None) => {
                return Err(LockError::InvalidArgument(
                    "no Redis client or URL provided".to_string(),
                ));
            }
        };
        Ok(RedisLockStore::new(client, self.key_prefix))
    }

    /// Builds the store and wraps it in a provider with default options.
    pub async fn build_provider(self) -> LockResult<RedisLockProvider> {
        Ok(KvLockProvider::new(self.build().await?))
    }
}

impl Default for RedisLockStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RedisLockStore {
    /// Returns a new builder for configuring the store.
    pub fn builder() -> RedisLockStoreBuilder {
        RedisLockStoreBuilder::new()
    }

    /// Connects to the Redis server at `url`.
    pub async fn connect(url: impl Into<String>) -> LockResult<Self> {
        Self::builder().url(url).build().await
    }
}

async fn connect(url: &str) -> LockResult<RedisClient> {
    let config = RedisConfig::from_url(url).map_err(|e| {
        LockError::InvalidArgument(format!("invalid Redis URL '{url}': {e}"))
    })?;

    let client = RedisClient::new(config, None, None, None);
    client.connect();
    client.wait_for_connect().await.map_err(|e| {
        LockError::Connection(Box::new(std::io::Error::other(format!(
            "failed to connect to Redis: {e}"
        ))))
    })?;
    tracing::debug!(url, "connected to Redis");

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_without_target_fails() {
        let result = RedisLockStoreBuilder::new().build().await;
        assert!(matches!(result, Err(LockError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_connecting() {
        let result = RedisLockStore::connect("not a url").await;
        assert!(matches!(result, Err(LockError::InvalidArgument(_))));
    }
}
