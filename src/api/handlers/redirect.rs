//! Handler for the redirect surface.

use axum::{
    extract::{ConnectInfo, Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::debug;

use crate::domain::access_event::{AccessEvent, AccessOutcome};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Routable API version. Only one exists; anything else is an unknown path.
const API_VERSION: &str = "v1";

/// Resolves a short link to its destination and redirects.
///
/// # Endpoint
///
/// `GET /{version}/{business_unit}/{link_code}?arbitrary=query`
///
/// # Request Flow
///
/// 1. Extract the client IP (`X-Real-IP` / `X-Forwarded-For` when behind a
///    proxy, else the peer address)
/// 2. Rate-limit admission — denied requests stop here and never touch
///    target capacity
/// 3. Resolve the link, pick a target (sticky or fresh weighted selection),
///    transform the query
/// 4. Queue the decision for the access log worker (fire-and-forget)
/// 5. Respond `302 Found` with the destination in `Location`
///
/// # Errors
///
/// - `404` when the link is unknown or inactive
/// - `429` when the rate limiter denies
/// - `5xx` when a dependency fails and no backup is possible
pub async fn redirect_handler(
    Path((version, business_unit, link_code)): Path<(String, String, String)>,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    if version != API_VERSION {
        return Err(AppError::link_not_found(
            "Link not found",
            json!({ "version": version }),
        ));
    }

    let ip = client_ip(&headers, addr, state.behind_proxy);

    let rate_key = if state.rate_limit_per_link {
        format!("{}:{}", ip, link_code)
    } else {
        ip.clone()
    };

    if !state.rate_limiter.admit(&rate_key).await {
        metrics::counter!("redirect_rate_limited_total").increment(1);
        return Err(AppError::rate_limited(
            "Too many requests",
            json!({ "link_code": link_code }),
        ));
    }

    let query: Vec<(String, String)> = raw_query
        .as_deref()
        .map(|raw| url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let outcome = state
        .redirect_service
        .resolve(&business_unit, &link_code, &ip, &query)
        .await?;

    let access_outcome = if outcome.target_id.is_some() {
        AccessOutcome::Target
    } else {
        AccessOutcome::Backup
    };
    metrics::counter!("redirects_served_total", "outcome" => access_outcome.as_str())
        .increment(1);

    let event = AccessEvent::new(
        outcome.link_id,
        outcome.target_id,
        access_outcome,
        ip,
        outcome.country.clone(),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    // The queue being full costs a log row, never the redirect
    if state.access_sender.try_send(event).is_err() {
        metrics::counter!("access_log_dropped_total").increment(1);
        debug!("Access log queue full, dropping event");
    }

    Ok((StatusCode::FOUND, [(header::LOCATION, outcome.location)]).into_response())
}
