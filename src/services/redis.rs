//! Redis-backed collection cache

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};

use super::cache::{CacheError, CacheLayer};

#[derive(Clone)]
pub struct RedisCache {
    client: Client,
}

impl RedisCache {
    /// Open a Redis client. An unreachable server is only logged: the cache
    /// is optional, and each call reconnects.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url)?;
        let cache = Self { client };

        match cache.connection().await {
            Ok(mut conn) => {
                if let Err(e) = redis::cmd("PING").query_async::<_, String>(&mut conn).await {
                    tracing::warn!("Redis connection test failed: {}", e);
                }
            }
            Err(e) => tracing::warn!("Redis unreachable at startup, caching degraded: {}", e),
        }

        Ok(cache)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl CacheLayer for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        // EX takes whole seconds and rejects zero
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
