//! Application error taxonomy and HTTP response mapping.
//!
//! Only conditions that prevent producing any redirect surface as HTTP
//! errors; everything else (geo lookup failure, malformed parameter
//! mappings, exhausted target pools with a backup URL) degrades inside the
//! decision flow and never reaches this type.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Errors surfaced by the redirect engine.
#[derive(Debug, Error)]
pub enum AppError {
    /// No link exists for the requested business unit and code.
    #[error("link not found: {message}")]
    LinkNotFound { message: String, details: Value },

    /// The link exists but has been deactivated by the control plane.
    #[error("link inactive: {message}")]
    LinkInactive { message: String, details: Value },

    /// The client exceeded the configured request rate.
    #[error("rate limited: {message}")]
    RateLimited { message: String, details: Value },

    /// Every target is exhausted or filtered out and no backup URL exists.
    #[error("no eligible target: {message}")]
    NoEligibleTarget { message: String, details: Value },

    /// A downstream dependency did not answer within the configured timeout.
    #[error("dependency timeout: {message}")]
    DependencyTimeout { message: String, details: Value },

    /// A downstream dependency answered with a failure.
    #[error("dependency unavailable: {message}")]
    DependencyUnavailable { message: String, details: Value },

    #[error("internal error: {message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn link_not_found(message: impl Into<String>, details: Value) -> Self {
        Self::LinkNotFound {
            message: message.into(),
            details,
        }
    }

    pub fn link_inactive(message: impl Into<String>, details: Value) -> Self {
        Self::LinkInactive {
            message: message.into(),
            details,
        }
    }

    pub fn rate_limited(message: impl Into<String>, details: Value) -> Self {
        Self::RateLimited {
            message: message.into(),
            details,
        }
    }

    pub fn no_eligible_target(message: impl Into<String>, details: Value) -> Self {
        Self::NoEligibleTarget {
            message: message.into(),
            details,
        }
    }

    pub fn dependency_timeout(message: impl Into<String>, details: Value) -> Self {
        Self::DependencyTimeout {
            message: message.into(),
            details,
        }
    }

    pub fn dependency_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::DependencyUnavailable {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::LinkNotFound { message, details } => {
                (StatusCode::NOT_FOUND, "link_not_found", message, details)
            }
            AppError::LinkInactive { message, details } => {
                (StatusCode::NOT_FOUND, "link_inactive", message, details)
            }
            AppError::RateLimited { message, details } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                message,
                details,
            ),
            AppError::NoEligibleTarget { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "no_eligible_target",
                message,
                details,
            ),
            AppError::DependencyTimeout { message, details } => (
                StatusCode::GATEWAY_TIMEOUT,
                "dependency_timeout",
                message,
                details,
            ),
            AppError::DependencyUnavailable { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "dependency_unavailable",
                message,
                details,
            ),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => {
                AppError::dependency_timeout("Database pool timed out", json!({}))
            }
            other => AppError::dependency_unavailable(
                "Database error",
                json!({ "reason": other.to_string() }),
            ),
        }
    }
}
