//! Read-through cached link resolution.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::{Retry, strategy::FixedInterval};
use tracing::{debug, error};

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_validator::{is_valid_business_unit, is_valid_link_code};

/// Resolves `(business_unit, link_code)` to a link and its active targets.
///
/// Cache-first: a hit skips the store entirely, a miss queries the store
/// under a bounded timeout with at most two retries and then refreshes the
/// cache fire-and-forget. Control-plane edits become visible within the
/// cache TTL; the registry itself has no side effects.
pub struct LinkRegistry {
    repo: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    cache_ttl_seconds: u64,
    dependency_timeout: Duration,
}

impl LinkRegistry {
    pub fn new(
        repo: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        cache_ttl_seconds: u64,
        dependency_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            cache,
            cache_ttl_seconds,
            dependency_timeout,
        }
    }

    /// Resolves a link, consulting the cache before the store.
    ///
    /// # Errors
    ///
    /// - [`AppError::LinkNotFound`] for malformed codes, unknown codes, or a
    ///   business unit mismatch
    /// - [`AppError::LinkInactive`] when the link has been deactivated
    /// - [`AppError::DependencyTimeout`] / [`AppError::DependencyUnavailable`]
    ///   when the store cannot be read
    pub async fn resolve(&self, business_unit: &str, link_code: &str) -> Result<Link, AppError> {
        if !is_valid_business_unit(business_unit) || !is_valid_link_code(link_code) {
            return Err(AppError::link_not_found(
                "Link not found",
                json!({ "business_unit": business_unit, "link_code": link_code }),
            ));
        }

        let cache_key = format!("{}:{}", business_unit, link_code);

        if let Ok(Some(link)) = self.cache.get_link(&cache_key).await {
            debug!("Registry cache HIT for {}", cache_key);
            return Self::check_active(link);
        }

        let strategy = FixedInterval::from_millis(50).take(2);
        let found = Retry::spawn(strategy, || async {
            match tokio::time::timeout(
                self.dependency_timeout,
                self.repo.find_by_code(business_unit, link_code),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(AppError::dependency_timeout(
                    "Link store did not answer",
                    json!({ "timeout_ms": self.dependency_timeout.as_millis() as u64 }),
                )),
            }
        })
        .await?;

        let Some(link) = found else {
            return Err(AppError::link_not_found(
                "Link not found",
                json!({ "business_unit": business_unit, "link_code": link_code }),
            ));
        };

        // Refresh the cache off the request path (fire-and-forget)
        let cache = self.cache.clone();
        let key = cache_key.clone();
        let snapshot = link.clone();
        let ttl = self.cache_ttl_seconds;
        tokio::spawn(async move {
            if let Err(e) = cache.set_link(&key, &snapshot, Some(ttl)).await {
                error!("Failed to cache link {}: {}", key, e);
            }
        });

        Self::check_active(link)
    }

    fn check_active(link: Link) -> Result<Link, AppError> {
        if !link.is_active {
            return Err(AppError::link_inactive(
                "Link is inactive",
                json!({ "link_code": link.link_code }),
            ));
        }
        Ok(link)
    }
}
