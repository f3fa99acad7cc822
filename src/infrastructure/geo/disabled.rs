//! No-op geo resolver.

use async_trait::async_trait;
use tracing::debug;

use super::{GeoError, GeoResolver};

/// Resolver used when geo lookups are disabled.
///
/// Every address reads as "country unknown", so only wildcard targets
/// remain eligible for country-restricted links.
pub struct DisabledGeoResolver;

impl DisabledGeoResolver {
    pub fn new() -> Self {
        debug!("Using DisabledGeoResolver (geo lookups disabled)");
        Self
    }
}

impl Default for DisabledGeoResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeoResolver for DisabledGeoResolver {
    async fn country(&self, _ip: &str) -> Result<Option<String>, GeoError> {
        Ok(None)
    }
}
