//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;

use crate::domain::entities::Link;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching resolved link definitions.
///
/// Implementations must be thread-safe and handle errors gracefully without
/// disrupting the decision flow (cache failures degrade to store lookups).
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves a cached link definition.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(link))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    async fn get_link(&self, key: &str) -> CacheResult<Option<Link>>;

    /// Stores a link definition with optional TTL.
    ///
    /// Implementations should log errors and return `Ok(())` rather than
    /// propagating them into the request flow.
    async fn set_link(&self, key: &str, link: &Link, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Removes a cached link definition.
    ///
    /// Used when the control plane signals an invalidation.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
