//! Shared application state injected into handlers.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::RedirectService;
use crate::domain::access_event::AccessEvent;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::ratelimit::RateLimiter;
use crate::infrastructure::sticky::StickyStore;

#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub links: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub sticky: Arc<dyn StickyStore>,
    pub access_sender: mpsc::Sender<AccessEvent>,
    pub behind_proxy: bool,
    pub rate_limit_per_link: bool,
}
