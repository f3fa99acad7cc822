//! Target entity: a weighted, capacity- and geography-constrained destination.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A candidate destination URL under a [`crate::domain::entities::Link`].
///
/// Selection among a link's targets is governed by `weight` (relative, no
/// need to sum to 100), `cap` (lifetime hit ceiling, `0` = unlimited), and
/// `countries` (empty = matches any country). `current_hits` is mutated only
/// through the repository's atomic reservation; the copy held here is a
/// snapshot from resolve time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: i64,
    pub link_id: i64,
    pub url: String,
    pub weight: i32,
    pub cap: i64,
    pub current_hits: i64,
    pub countries: Vec<String>,
    pub param_mapping: HashMap<String, String>,
    pub static_params: HashMap<String, String>,
    pub is_active: bool,
}

impl Target {
    /// Returns true if the target can still absorb a hit.
    pub fn has_capacity(&self) -> bool {
        self.cap == 0 || self.current_hits < self.cap
    }

    /// Returns true if the target accepts requests from `country`.
    ///
    /// An empty country set matches everything, as does an `ALL` entry.
    /// An unknown country (`None`, e.g. after a failed geo lookup) matches
    /// only those wildcard targets. Comparison is case-insensitive.
    pub fn matches_country(&self, country: Option<&str>) -> bool {
        if self.countries.is_empty() {
            return true;
        }
        if self
            .countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case("ALL"))
        {
            return true;
        }
        match country {
            Some(code) => self.countries.iter().any(|c| c.eq_ignore_ascii_case(code)),
            None => false,
        }
    }

    /// Returns true if the target may be offered to a request from `country`.
    pub fn is_eligible(&self, country: Option<&str>) -> bool {
        self.is_active && self.has_capacity() && self.matches_country(country)
    }
}
