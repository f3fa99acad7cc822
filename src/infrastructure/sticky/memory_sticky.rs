//! In-memory sticky assignment store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

use super::StickyStore;
use crate::infrastructure::cache::CacheResult;

/// Process-local sticky store.
///
/// Used when Redis is not configured, and by the integration tests.
/// Assignments are only visible to the local instance, which is acceptable
/// for single-node deployments. Expired entries are dropped lazily on read
/// and swept whenever the map grows past a threshold.
pub struct MemoryStickyStore {
    entries: Mutex<HashMap<String, (i64, Instant)>>,
}

const SWEEP_THRESHOLD: usize = 10_000;

impl MemoryStickyStore {
    pub fn new() -> Self {
        debug!("Using MemoryStickyStore (process-local sticky assignments)");
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStickyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StickyStore for MemoryStickyStore {
    async fn get(&self, key: &str) -> CacheResult<Option<i64>> {
        let mut entries = self.entries.lock().expect("sticky store lock poisoned");

        match entries.get(key) {
            Some((target_id, expires_at)) if *expires_at > Instant::now() => Ok(Some(*target_id)),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, target_id: i64, ttl: Duration) -> CacheResult<()> {
        let mut entries = self.entries.lock().expect("sticky store lock poisoned");

        if entries.len() >= SWEEP_THRESHOLD {
            let now = Instant::now();
            entries.retain(|_, (_, expires_at)| *expires_at > now);
        }

        entries.insert(key.to_string(), (target_id, Instant::now() + ttl));
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
