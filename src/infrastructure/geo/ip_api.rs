//! ip-api.com geo lookup provider.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use super::{GeoError, GeoResolver};

const IP_API_ENDPOINT: &str = "http://ip-api.com/json";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
}

/// HTTP resolver backed by the free ip-api.com endpoint.
///
/// Results are cached in-process up to a configured size; the cache is
/// cleared wholesale when full, which is adequate for the hot-IP reuse
/// pattern this service sees. Private and loopback addresses short-circuit
/// to "unknown" without a network call.
pub struct IpApiGeoResolver {
    http: reqwest::Client,
    cache: Mutex<HashMap<String, Option<String>>>,
    cache_size: usize,
}

impl IpApiGeoResolver {
    pub fn new(cache_size: usize) -> Self {
        let http = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            cache: Mutex::new(HashMap::new()),
            cache_size,
        }
    }

    /// Returns true for addresses that cannot have a public classification.
    fn is_private(ip: &str) -> bool {
        match ip.parse::<IpAddr>() {
            Ok(IpAddr::V4(v4)) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
            Ok(IpAddr::V6(v6)) => v6.is_loopback() || v6.is_unique_local(),
            // Not an IP literal at all, nothing to look up
            Err(_) => true,
        }
    }
}

#[async_trait]
impl GeoResolver for IpApiGeoResolver {
    async fn country(&self, ip: &str) -> Result<Option<String>, GeoError> {
        if Self::is_private(ip) {
            return Ok(None);
        }

        if let Some(cached) = self
            .cache
            .lock()
            .expect("geo cache lock poisoned")
            .get(ip)
            .cloned()
        {
            return Ok(cached);
        }

        let url = format!("{}/{}?fields=status,countryCode", IP_API_ENDPOINT, ip);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GeoError::LookupError(format!("ip-api request failed: {}", e)))?;

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| GeoError::LookupError(format!("ip-api response unreadable: {}", e)))?;

        let country = if body.status == "success" {
            body.country_code
                .filter(|c| !c.is_empty())
                .map(|c| c.to_ascii_uppercase())
        } else {
            warn!("ip-api could not classify {}", ip);
            None
        };

        debug!("Geo lookup: {} -> {:?}", ip, country);

        let mut cache = self.cache.lock().expect("geo cache lock poisoned");
        if cache.len() >= self.cache_size {
            cache.clear();
        }
        cache.insert(ip.to_string(), country.clone());

        Ok(country)
    }
}
