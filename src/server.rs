//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, Redis-or-fallback wiring, worker spawning,
//! and Axum server lifecycle.

use crate::application::services::{LinkRegistry, RedirectService, TargetSelector};
use crate::config::Config;
use crate::domain::access_worker::run_access_worker;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::geo::{DisabledGeoResolver, GeoResolver, IpApiGeoResolver};
use crate::infrastructure::persistence::{PgAccessLogRepository, PgLinkRepository};
use crate::infrastructure::ratelimit::{MemoryRateLimiter, RateLimiter, RedisRateLimiter};
use crate::infrastructure::sticky::{MemoryStickyStore, RedisStickyStore, StickyStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Redis-backed link cache, sticky store, and rate limiter (with
///   in-process fallbacks when Redis is absent or unreachable)
/// - Geo resolver
/// - Background access log worker
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate");

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Link cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Link cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let sticky: Arc<dyn StickyStore> = if let Some(redis_url) = &config.redis_url {
        match RedisStickyStore::connect(redis_url).await {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                tracing::warn!(
                    "Failed to connect sticky store to Redis: {}. Using in-memory store.",
                    e
                );
                Arc::new(MemoryStickyStore::new())
            }
        }
    } else {
        Arc::new(MemoryStickyStore::new())
    };

    let rate_limiter: Arc<dyn RateLimiter> = if let Some(redis_url) = &config.redis_url {
        match RedisRateLimiter::connect(
            redis_url,
            config.rate_limit_max,
            config.rate_limit_window_seconds,
        )
        .await
        {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                tracing::warn!(
                    "Failed to connect rate limiter to Redis: {}. Using in-memory limiter.",
                    e
                );
                Arc::new(MemoryRateLimiter::new(
                    config.rate_limit_max,
                    config.rate_limit_window_seconds,
                ))
            }
        }
    } else {
        Arc::new(MemoryRateLimiter::new(
            config.rate_limit_max,
            config.rate_limit_window_seconds,
        ))
    };

    let geo: Arc<dyn GeoResolver> = match config.geoip_provider.as_str() {
        "ip-api" => {
            tracing::info!("Geo lookups enabled (ip-api)");
            Arc::new(IpApiGeoResolver::new(config.geoip_cache_size))
        }
        _ => Arc::new(DisabledGeoResolver::new()),
    };

    let pool = Arc::new(pool);
    let links = Arc::new(PgLinkRepository::new(pool.clone()));
    let access_logs = Arc::new(PgAccessLogRepository::new(pool.clone()));

    let (access_tx, access_rx) = mpsc::channel(config.access_queue_capacity);
    tokio::spawn(run_access_worker(access_rx, access_logs, links.clone()));
    tracing::info!("Access log worker started");

    let registry = Arc::new(LinkRegistry::new(
        links.clone(),
        cache.clone(),
        config.cache_ttl_seconds,
        Duration::from_millis(config.dependency_timeout_ms),
    ));
    let selector = Arc::new(TargetSelector::new(links.clone()));
    let redirect_service = Arc::new(RedirectService::new(
        registry,
        selector,
        sticky.clone(),
        geo,
        Duration::from_secs(config.sticky_ttl_seconds),
        config.sticky_session_param.clone(),
        Duration::from_millis(config.dependency_timeout_ms),
    ));

    let state = AppState {
        redirect_service,
        rate_limiter,
        links,
        cache,
        sticky,
        access_sender: access_tx,
        behind_proxy: config.behind_proxy,
        rate_limit_per_link: config.rate_limit_per_link,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}
