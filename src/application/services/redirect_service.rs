//! Per-request decision orchestration.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::application::services::link_registry::LinkRegistry;
use crate::application::services::param_transformer::{
    build_destination_url, passthrough, transform,
};
use crate::application::services::target_selector::{Selection, TargetSelector};
use crate::domain::entities::{Link, Target};
use crate::error::AppError;
use crate::infrastructure::geo::GeoResolver;
use crate::infrastructure::sticky::StickyStore;

/// The resolved destination for one request.
#[derive(Debug, Clone)]
pub struct RedirectOutcome {
    /// Fully assembled destination URL, ready for the Location header.
    pub location: String,
    pub link_id: i64,
    /// `None` when the request fell back to the backup URL.
    pub target_id: Option<i64>,
    /// Country the request was classified as, for the decision log.
    pub country: Option<String>,
}

/// Computes a destination for an admitted request.
///
/// Flow: resolve the link, classify the client's country (failure reads as
/// unknown), honor the advisory link-wide ceiling, reuse the sticky
/// assignment when it is still eligible, otherwise run a fresh weighted
/// selection, and assemble the destination URL. Anything that can degrade
/// does; only resolution and store failures surface as errors.
pub struct RedirectService {
    registry: Arc<LinkRegistry>,
    selector: Arc<TargetSelector>,
    sticky: Arc<dyn StickyStore>,
    geo: Arc<dyn GeoResolver>,
    sticky_ttl: Duration,
    /// Query parameter folded into the sticky key, widening its scope from
    /// plain client IP to IP + session.
    sticky_session_param: Option<String>,
    /// Bound on a single sticky store round-trip; an elapsed timeout reads
    /// as "no assignment" rather than failing the request.
    dependency_timeout: Duration,
}

impl RedirectService {
    pub fn new(
        registry: Arc<LinkRegistry>,
        selector: Arc<TargetSelector>,
        sticky: Arc<dyn StickyStore>,
        geo: Arc<dyn GeoResolver>,
        sticky_ttl: Duration,
        sticky_session_param: Option<String>,
        dependency_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            selector,
            sticky,
            geo,
            sticky_ttl,
            sticky_session_param,
            dependency_timeout,
        }
    }

    /// Resolves one request to a destination.
    ///
    /// # Errors
    ///
    /// - [`AppError::LinkNotFound`] / [`AppError::LinkInactive`] from resolution
    /// - [`AppError::NoEligibleTarget`] when the pool is exhausted and the
    ///   link has no backup URL
    /// - dependency errors from the store
    pub async fn resolve(
        &self,
        business_unit: &str,
        link_code: &str,
        client_ip: &str,
        query: &[(String, String)],
    ) -> Result<RedirectOutcome, AppError> {
        let link = self.registry.resolve(business_unit, link_code).await?;

        let country = match self.geo.country(client_ip).await {
            Ok(country) => country,
            Err(e) => {
                // Unknown country narrows eligibility to wildcard targets
                warn!("Geo lookup failed for {}: {}", client_ip, e);
                None
            }
        };

        if link.is_over_total_cap() {
            debug!(
                link_code,
                total_cap = link.total_cap,
                "Link ceiling reached, serving backup"
            );
            return self.backup_outcome(&link, query, country);
        }

        let sticky_key = self.sticky_key(client_ip, link_code, query);

        if let Some(target_id) = self.remembered_target(&sticky_key).await
            && let Some(target) = link.targets.iter().find(|t| t.id == target_id)
            && target.is_active
            && target.matches_country(country.as_deref())
            && self.selector.reserve(target).await?
        {
            self.remember(&sticky_key, target_id).await;
            return Ok(self.target_outcome(&link, target, query, country));
        }

        match self.selector.select(&link, country.as_deref()).await? {
            Selection::Target(target) => {
                self.remember(&sticky_key, target.id).await;
                Ok(self.target_outcome(&link, &target, query, country))
            }
            Selection::Backup => self.backup_outcome(&link, query, country),
        }
    }

    fn sticky_key(&self, client_ip: &str, link_code: &str, query: &[(String, String)]) -> String {
        match &self.sticky_session_param {
            Some(param) => {
                let session = query
                    .iter()
                    .find(|(k, _)| k == param)
                    .map(|(_, v)| v.as_str())
                    .unwrap_or("");
                format!("{}:{}:{}", client_ip, link_code, session)
            }
            None => format!("{}:{}", client_ip, link_code),
        }
    }

    async fn remembered_target(&self, sticky_key: &str) -> Option<i64> {
        match tokio::time::timeout(self.dependency_timeout, self.sticky.get(sticky_key)).await {
            Ok(Ok(target_id)) => target_id,
            Ok(Err(e)) => {
                warn!("Sticky lookup failed for {}: {}", sticky_key, e);
                None
            }
            Err(_) => {
                warn!("Sticky lookup timed out for {}", sticky_key);
                None
            }
        }
    }

    /// Stores or refreshes an assignment; failures only cost stickiness.
    async fn remember(&self, sticky_key: &str, target_id: i64) {
        match tokio::time::timeout(
            self.dependency_timeout,
            self.sticky.set(sticky_key, target_id, self.sticky_ttl),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Sticky write failed for {}: {}", sticky_key, e),
            Err(_) => warn!("Sticky write timed out for {}", sticky_key),
        }
    }

    fn target_outcome(
        &self,
        link: &Link,
        target: &Target,
        query: &[(String, String)],
        country: Option<String>,
    ) -> RedirectOutcome {
        let params = transform(query, &target.param_mapping, &target.static_params);
        RedirectOutcome {
            location: build_destination_url(&target.url, &params),
            link_id: link.id,
            target_id: Some(target.id),
            country,
        }
    }

    fn backup_outcome(
        &self,
        link: &Link,
        query: &[(String, String)],
        country: Option<String>,
    ) -> Result<RedirectOutcome, AppError> {
        let Some(backup_url) = link.backup_url() else {
            return Err(AppError::no_eligible_target(
                "No targets available",
                json!({ "link_code": link.link_code }),
            ));
        };

        Ok(RedirectOutcome {
            location: build_destination_url(backup_url, &passthrough(query)),
            link_id: link.id,
            target_id: None,
            country,
        })
    }
}
