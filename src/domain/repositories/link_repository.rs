//! Repository trait for link and target data access.

use crate::domain::entities::Link;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for resolving links and reserving target capacity.
///
/// Link and target definitions are written by the external control plane;
/// this interface exposes only what the decision flow needs: a lookup and
/// the one mutation the engine owns, the per-target hit reservation.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-memory implementation
///   for tests and database-free runs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a link and its active targets by business unit and code.
    ///
    /// Targets are returned in ascending id order; soft-deleted links are
    /// not returned.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found (regardless of `is_active` — the caller
    ///   distinguishes inactive from missing)
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DependencyUnavailable`] on store errors.
    async fn find_by_code(
        &self,
        business_unit: &str,
        link_code: &str,
    ) -> Result<Option<Link>, AppError>;

    /// Atomically consumes one unit of a target's capacity.
    ///
    /// The increment succeeds only while the target is active and under its
    /// cap (`cap = 0` means unlimited), so concurrent reservations can never
    /// push `current_hits` past a positive cap.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the hit was reserved
    /// - `Ok(false)` if the target is at cap or inactive
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DependencyUnavailable`] on store errors.
    async fn reserve_target_hit(&self, target_id: i64) -> Result<bool, AppError>;

    /// Bumps a link's advisory hit counter.
    ///
    /// Called by the access worker after a target redirect was served. Not
    /// linearizable on purpose: the link-wide ceiling is a soft limit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DependencyUnavailable`] on store errors.
    async fn record_link_hit(&self, link_id: i64) -> Result<(), AppError>;

    /// Checks whether the backing store answers queries.
    async fn health_check(&self) -> bool;
}
