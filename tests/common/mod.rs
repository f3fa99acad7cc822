#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use chrono::Utc;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;

use smart_redirect::domain::access_event::AccessEvent;
use smart_redirect::infrastructure::cache::NullCache;
use smart_redirect::infrastructure::geo::{DisabledGeoResolver, GeoError, GeoResolver};
use smart_redirect::infrastructure::persistence::MemoryLinkRepository;
use smart_redirect::infrastructure::ratelimit::MemoryRateLimiter;
use smart_redirect::infrastructure::sticky::MemoryStickyStore;
use smart_redirect::prelude::*;

/// Geo resolver answering every lookup with a fixed country.
pub struct FixedGeoResolver(pub Option<String>);

#[async_trait]
impl GeoResolver for FixedGeoResolver {
    async fn country(&self, _ip: &str) -> Result<Option<String>, GeoError> {
        Ok(self.0.clone())
    }
}

pub fn make_target(id: i64, weight: i32, cap: i64, countries: &[&str]) -> Target {
    Target {
        id,
        link_id: 1,
        url: format!("https://example.com/t{id}"),
        weight,
        cap,
        current_hits: 0,
        countries: countries.iter().map(|c| c.to_string()).collect(),
        param_mapping: HashMap::new(),
        static_params: HashMap::new(),
        is_active: true,
    }
}

pub fn make_link(code: &str, targets: Vec<Target>, backup: Option<&str>) -> Link {
    Link {
        id: 1,
        business_unit: "bu".to_string(),
        link_code: code.to_string(),
        total_cap: 0,
        current_hits: 0,
        backup_url: backup.map(|b| b.to_string()),
        is_active: true,
        created_at: Utc::now(),
        targets,
    }
}

/// Builds an [`AppState`] over the in-memory implementations, the way the
/// server wires the real ones.
pub fn create_test_state(
    repo: Arc<MemoryLinkRepository>,
    rate_limit_max: u32,
    geo: Arc<dyn GeoResolver>,
) -> (AppState, mpsc::Receiver<AccessEvent>) {
    let cache = Arc::new(NullCache::new());
    let sticky = Arc::new(MemoryStickyStore::new());

    let registry = Arc::new(LinkRegistry::new(
        repo.clone(),
        cache.clone(),
        3600,
        Duration::from_millis(500),
    ));
    let selector = Arc::new(TargetSelector::with_seed(repo.clone(), 42));
    let redirect_service = Arc::new(RedirectService::new(
        registry,
        selector,
        sticky.clone(),
        geo,
        Duration::from_secs(3600),
        None,
        Duration::from_millis(500),
    ));

    let (tx, rx) = mpsc::channel(100);

    let state = AppState {
        redirect_service,
        rate_limiter: Arc::new(MemoryRateLimiter::new(rate_limit_max, 3600)),
        links: repo,
        cache,
        sticky,
        access_sender: tx,
        behind_proxy: true,
        rate_limit_per_link: false,
    };

    (state, rx)
}

pub fn create_default_state(
    repo: Arc<MemoryLinkRepository>,
) -> (AppState, mpsc::Receiver<AccessEvent>) {
    create_test_state(repo, 1000, Arc::new(DisabledGeoResolver::new()))
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
