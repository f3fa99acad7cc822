//! Redis-backed sticky assignment store.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::StickyStore;
use crate::infrastructure::cache::{CacheError, CacheResult};

/// Sticky assignments in Redis, one `SETEX` key per (client, link) pair.
///
/// Fail-open like the link cache: read errors report "no assignment",
/// write errors are logged and swallowed.
pub struct RedisStickyStore {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisStickyStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the connection cannot be
    /// established.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Sticky store connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: "sticky:".to_string(),
        })
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl StickyStore for RedisStickyStore {
    async fn get(&self, key: &str) -> CacheResult<Option<i64>> {
        let key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<i64>>(&key).await {
            Ok(Some(target_id)) => {
                debug!("Sticky HIT: {} -> {}", key, target_id);
                Ok(Some(target_id))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                error!("Redis GET error for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, target_id: i64, ttl: Duration) -> CacheResult<()> {
        let key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn
            .set_ex::<_, _, ()>(&key, target_id, ttl.as_secs())
            .await
        {
            Ok(_) => {
                debug!("Sticky SET: {} -> {} (TTL: {:?})", key, target_id, ttl);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", key, e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
