//! PostgreSQL implementation of the access log repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::access_event::AccessEvent;
use crate::domain::repositories::AccessLogRepository;
use crate::error::AppError;

/// PostgreSQL sink for redirect decision records.
pub struct PgAccessLogRepository {
    pool: Arc<PgPool>,
}

impl PgAccessLogRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessLogRepository for PgAccessLogRepository {
    async fn insert(&self, event: &AccessEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO access_logs (link_id, target_id, outcome, ip, country, user_agent, referer)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.link_id)
        .bind(event.target_id)
        .bind(event.outcome.as_str())
        .bind(&event.ip)
        .bind(&event.country)
        .bind(&event.user_agent)
        .bind(&event.referer)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
