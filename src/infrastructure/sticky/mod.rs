//! Sticky assignment storage: remembered IP-to-target choices with TTL.
//!
//! Provides a [`StickyStore`] trait with two implementations:
//! - [`RedisStickyStore`] - shared store for multi-instance deployments
//! - [`MemoryStickyStore`] - single-process fallback and test store

mod memory_sticky;
mod redis_sticky;

use async_trait::async_trait;
use std::time::Duration;

pub use memory_sticky::MemoryStickyStore;
pub use redis_sticky::RedisStickyStore;

use crate::infrastructure::cache::CacheResult;

/// Keyed store remembering which target a client was last assigned.
///
/// Keys are opaque to the store; the redirect service composes them from
/// client IP, link code, and (optionally) a session parameter value.
/// Implementations expire entries after the TTL passed to [`Self::set`]
/// and must be fail-open: an unreachable store reads as "no assignment".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StickyStore: Send + Sync {
    /// Returns the remembered target id for `key`, if one is still live.
    async fn get(&self, key: &str) -> CacheResult<Option<i64>>;

    /// Remembers `target_id` under `key` for `ttl`, replacing any previous
    /// assignment and restarting its clock.
    async fn set(&self, key: &str, target_id: i64, ttl: Duration) -> CacheResult<()>;

    /// Checks if the store backend is healthy.
    async fn health_check(&self) -> bool;
}
