//! Repository trait for persisting redirect decisions.

use crate::domain::access_event::AccessEvent;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the decision log.
///
/// One row per served decision (target redirect or backup fallback),
/// written asynchronously by the access worker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessLogRepository: Send + Sync {
    /// Persists a single decision record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DependencyUnavailable`] on store errors.
    async fn insert(&self, event: &AccessEvent) -> Result<(), AppError>;
}
