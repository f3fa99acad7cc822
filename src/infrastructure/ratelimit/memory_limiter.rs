//! In-process keyed rate limiter.

use governor::{DefaultKeyedRateLimiter, Quota};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

use super::RateLimiter;

/// Keyed GCRA limiter for single-instance deployments and tests.
///
/// The configured `(max, window)` pair is expressed as a burst of `max`
/// replenished evenly across the window, which bounds sustained throughput
/// to the same rate as the fixed-window Redis variant.
pub struct MemoryRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl MemoryRateLimiter {
    /// Builds a limiter admitting `max_per_window` requests per key per
    /// `window_seconds`.
    ///
    /// # Panics
    ///
    /// Panics if `max_per_window` or `window_seconds` is zero; both are
    /// rejected earlier by config validation.
    pub fn new(max_per_window: u32, window_seconds: u64) -> Self {
        debug!("Using MemoryRateLimiter (process-local rate limiting)");

        let max = NonZeroU32::new(max_per_window).expect("RATE_LIMIT_MAX validated non-zero");
        let replenish = Duration::from_secs(window_seconds) / max_per_window;
        let quota = Quota::with_period(replenish)
            .expect("RATE_LIMIT_WINDOW_SECONDS validated non-zero")
            .allow_burst(max);

        Self {
            limiter: DefaultKeyedRateLimiter::keyed(quota),
        }
    }
}

#[async_trait::async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn admit(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }
}
