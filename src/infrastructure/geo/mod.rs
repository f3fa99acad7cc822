//! Client geography lookup.
//!
//! Provides a [`GeoResolver`] trait with two implementations:
//! - [`IpApiGeoResolver`] - ip-api.com HTTP provider with an in-process cache
//! - [`DisabledGeoResolver`] - always reports the country as unknown
//!
//! A failed or disabled lookup yields `None`, which the selector treats as
//! "matches only wildcard targets" — geography problems narrow the pool,
//! they never fail the redirect.

mod disabled;
mod ip_api;

use async_trait::async_trait;
use std::fmt;

pub use disabled::DisabledGeoResolver;
pub use ip_api::IpApiGeoResolver;

/// Errors that can occur during geo lookups.
#[derive(Debug)]
pub enum GeoError {
    LookupError(String),
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::LookupError(e) => write!(f, "Geo lookup error: {}", e),
        }
    }
}

impl std::error::Error for GeoError {}

/// Maps a client IP to an ISO 3166-1 alpha-2 country code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Resolves the country for `ip`.
    ///
    /// Returns `Ok(None)` when the provider cannot classify the address
    /// (private ranges, lookups disabled, unrecognized IP).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::LookupError`] on transport failures; callers
    /// degrade this to "country unknown".
    async fn country(&self, ip: &str) -> Result<Option<String>, GeoError>;
}
