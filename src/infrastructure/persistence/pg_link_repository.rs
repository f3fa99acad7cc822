//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::domain::entities::{Link, Target};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for link resolution and capacity reservation.
///
/// Queries are bound at runtime so the crate builds without a live
/// database; the schema is created by the bundled migrations.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    business_unit: String,
    link_code: String,
    total_cap: i64,
    current_hits: i64,
    backup_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TargetRow {
    id: i64,
    link_id: i64,
    url: String,
    weight: i32,
    cap: i64,
    current_hits: i64,
    countries: Vec<String>,
    param_mapping: Option<serde_json::Value>,
    static_params: Option<serde_json::Value>,
    is_active: bool,
}

impl TargetRow {
    fn into_target(self) -> Target {
        let param_mapping = parse_param_map(self.param_mapping, "param_mapping", self.id);
        let static_params = parse_param_map(self.static_params, "static_params", self.id);

        Target {
            id: self.id,
            link_id: self.link_id,
            url: self.url,
            weight: self.weight,
            cap: self.cap,
            current_hits: self.current_hits,
            countries: self.countries,
            param_mapping,
            static_params,
            is_active: self.is_active,
        }
    }
}

/// Decodes a JSONB column into a string-to-string map.
///
/// The control plane validates these on write, but a malformed value must
/// degrade to "no mapping" (pass-through) rather than fail the redirect.
fn parse_param_map(
    value: Option<serde_json::Value>,
    column: &str,
    target_id: i64,
) -> HashMap<String, String> {
    match value {
        None | Some(serde_json::Value::Null) => HashMap::new(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(target_id, "Malformed {} configuration, ignoring: {}", column, e);
            HashMap::new()
        }),
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_code(
        &self,
        business_unit: &str,
        link_code: &str,
    ) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, business_unit, link_code, total_cap, current_hits,
                   backup_url, is_active, created_at
            FROM links
            WHERE business_unit = $1 AND link_code = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(business_unit)
        .bind(link_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let targets = sqlx::query_as::<_, TargetRow>(
            r#"
            SELECT id, link_id, url, weight, cap, current_hits,
                   countries, param_mapping, static_params, is_active
            FROM targets
            WHERE link_id = $1 AND is_active
            ORDER BY id
            "#,
        )
        .bind(row.id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(Some(Link {
            id: row.id,
            business_unit: row.business_unit,
            link_code: row.link_code,
            total_cap: row.total_cap,
            current_hits: row.current_hits,
            backup_url: row.backup_url,
            is_active: row.is_active,
            created_at: row.created_at,
            targets: targets.into_iter().map(TargetRow::into_target).collect(),
        }))
    }

    async fn reserve_target_hit(&self, target_id: i64) -> Result<bool, AppError> {
        // The WHERE clause is the compare half of compare-and-increment:
        // a concurrent reservation that would cross the cap matches zero rows
        let result = sqlx::query(
            r#"
            UPDATE targets
            SET current_hits = current_hits + 1, updated_at = now()
            WHERE id = $1 AND is_active AND (cap = 0 OR current_hits < cap)
            "#,
        )
        .bind(target_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_link_hit(&self, link_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE links
            SET current_hits = current_hits + 1, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(link_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
