//! In-memory implementation of the link repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Process-local link store.
///
/// Backs the integration and property tests, where the single mutex gives
/// the same per-target reservation atomicity the conditional UPDATE gives
/// in Postgres. Links are registered up front with [`Self::add_link`];
/// lookups clone a snapshot the way a database read would.
pub struct MemoryLinkRepository {
    links: Mutex<HashMap<(String, String), Link>>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            links: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a link, replacing any previous definition of the same
    /// `(business_unit, link_code)` pair.
    pub fn add_link(&self, link: Link) {
        let mut links = self.links.lock().expect("link store lock poisoned");
        links.insert((link.business_unit.clone(), link.link_code.clone()), link);
    }

    /// Returns the current hit count of a target, if it exists.
    pub fn target_hits(&self, target_id: i64) -> Option<i64> {
        let links = self.links.lock().expect("link store lock poisoned");
        links
            .values()
            .flat_map(|l| l.targets.iter())
            .find(|t| t.id == target_id)
            .map(|t| t.current_hits)
    }

    /// Returns the advisory hit count of a link, if it exists.
    pub fn link_hits(&self, business_unit: &str, link_code: &str) -> Option<i64> {
        let links = self.links.lock().expect("link store lock poisoned");
        links
            .get(&(business_unit.to_string(), link_code.to_string()))
            .map(|l| l.current_hits)
    }
}

impl Default for MemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn find_by_code(
        &self,
        business_unit: &str,
        link_code: &str,
    ) -> Result<Option<Link>, AppError> {
        let links = self.links.lock().expect("link store lock poisoned");
        let link = links.get(&(business_unit.to_string(), link_code.to_string()));

        Ok(link.map(|l| {
            let mut snapshot = l.clone();
            snapshot.targets.retain(|t| t.is_active);
            snapshot.targets.sort_by_key(|t| t.id);
            snapshot
        }))
    }

    async fn reserve_target_hit(&self, target_id: i64) -> Result<bool, AppError> {
        let mut links = self.links.lock().expect("link store lock poisoned");

        for link in links.values_mut() {
            if let Some(target) = link.targets.iter_mut().find(|t| t.id == target_id) {
                if target.is_active && (target.cap == 0 || target.current_hits < target.cap) {
                    target.current_hits += 1;
                    return Ok(true);
                }
                return Ok(false);
            }
        }

        Ok(false)
    }

    async fn record_link_hit(&self, link_id: i64) -> Result<(), AppError> {
        let mut links = self.links.lock().expect("link store lock poisoned");

        if let Some(link) = links.values_mut().find(|l| l.id == link_id) {
            link.current_hits += 1;
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
