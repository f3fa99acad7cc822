//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
    pub cache: CheckStatus,
    pub sticky_store: CheckStatus,
    pub access_queue: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    pub message: Option<String>,
}

impl CheckStatus {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: Some(message.into()),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }
}

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = if state.links.health_check().await {
        CheckStatus::ok("Link store reachable")
    } else {
        CheckStatus::error("Link store unreachable")
    };

    let cache = if state.cache.health_check().await {
        CheckStatus::ok("Cache reachable")
    } else {
        CheckStatus::error("Cache unreachable")
    };

    let sticky_store = if state.sticky.health_check().await {
        CheckStatus::ok("Sticky store reachable")
    } else {
        CheckStatus::error("Sticky store unreachable")
    };

    let access_queue = if state.access_sender.is_closed() {
        CheckStatus::error("Access log queue is closed")
    } else {
        CheckStatus::ok(format!("Capacity: {}", state.access_sender.capacity()))
    };

    let all_healthy = [&database, &cache, &sticky_store, &access_queue]
        .iter()
        .all(|c| c.status == "ok");

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            cache,
            sticky_store,
            access_queue,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
