//! Redis fixed-window rate limiter.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{info, warn};

use super::RateLimiter;
use crate::infrastructure::cache::{CacheError, CacheResult};

/// Fixed-window counter per key, shared across service instances.
///
/// The first request in a window creates the counter and arms its expiry;
/// subsequent requests increment it until the threshold is reached. When the
/// window elapses the key disappears and counting restarts.
pub struct RedisRateLimiter {
    client: ConnectionManager,
    max_per_window: u32,
    window_seconds: u64,
    key_prefix: String,
}

impl RedisRateLimiter {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the connection cannot be
    /// established.
    pub async fn connect(
        redis_url: &str,
        max_per_window: u32,
        window_seconds: u64,
    ) -> CacheResult<Self> {
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

        info!("✓ Rate limiter connected to Redis");

        Ok(Self {
            client: manager,
            max_per_window,
            window_seconds,
            key_prefix: "rate_limit:".to_string(),
        })
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn admit(&self, key: &str) -> bool {
        let key = self.build_key(key);
        let mut conn = self.client.clone();

        let count: i64 = match conn.incr::<_, _, i64>(&key, 1i64).await {
            Ok(count) => count,
            Err(e) => {
                // Fail open: an unreachable limiter must not take the
                // redirect surface down with it
                warn!("Redis INCR error for {}: {}", key, e);
                return true;
            }
        };

        if count == 1
            && let Err(e) = conn.expire::<_, ()>(&key, self.window_seconds as i64).await
        {
            warn!("Redis EXPIRE error for {}: {}", key, e);
        }

        count <= i64::from(self.max_per_window)
    }
}
