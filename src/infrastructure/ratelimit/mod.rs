//! Admission control bounding request rate per client.
//!
//! Provides a [`RateLimiter`] trait with two implementations:
//! - [`RedisRateLimiter`] - fixed-window counters shared across instances
//! - [`MemoryRateLimiter`] - keyed in-process limiter for Redis-less runs
//!
//! Admission runs before link resolution and target selection, so denied
//! requests never consume target capacity or skew weighted distributions.

mod memory_limiter;
mod redis_limiter;

use async_trait::async_trait;

pub use memory_limiter::MemoryRateLimiter;
pub use redis_limiter::RedisRateLimiter;

/// Per-key request admission.
///
/// The key is composed by the caller: plain client IP, or `ip:link_code`
/// when per-link scoping is configured. Implementations are fail-open: if
/// the backing store cannot be consulted the request is admitted, because a
/// redirect served late beats a redirect not served at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Returns true if the request identified by `key` may proceed.
    async fn admit(&self, key: &str) -> bool;
}
