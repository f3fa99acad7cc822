//! Link entity representing a routable short code and its target pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Target;

/// A short-code entry routable to one or more [`Target`]s.
///
/// Identified by `(business_unit, link_code)`. Created and edited by the
/// external control plane; read-only to the redirect engine. `total_cap` is
/// an advisory soft ceiling across all targets: `current_hits` is bumped
/// asynchronously by the access worker, and once at or over the ceiling the
/// link answers with its backup URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub business_unit: String,
    pub link_code: String,
    pub total_cap: i64,
    pub current_hits: i64,
    pub backup_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub targets: Vec<Target>,
}

impl Link {
    /// Returns true if the advisory link-wide ceiling has been reached.
    pub fn is_over_total_cap(&self) -> bool {
        self.total_cap > 0 && self.current_hits >= self.total_cap
    }

    /// Returns the backup URL, treating an empty string as absent.
    pub fn backup_url(&self) -> Option<&str> {
        self.backup_url.as_deref().filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(total_cap: i64, current_hits: i64) -> Link {
        Link {
            id: 1,
            business_unit: "bu".to_string(),
            link_code: "df7fca".to_string(),
            total_cap,
            current_hits,
            backup_url: Some("https://backup.example.com".to_string()),
            is_active: true,
            created_at: Utc::now(),
            targets: Vec::new(),
        }
    }

    #[test]
    fn test_total_cap_zero_is_unlimited() {
        assert!(!link(0, 1_000_000).is_over_total_cap());
    }

    #[test]
    fn test_total_cap_reached() {
        assert!(!link(100, 99).is_over_total_cap());
        assert!(link(100, 100).is_over_total_cap());
        assert!(link(100, 250).is_over_total_cap());
    }

    #[test]
    fn test_empty_backup_url_is_absent() {
        let mut l = link(0, 0);
        assert_eq!(l.backup_url(), Some("https://backup.example.com"));

        l.backup_url = Some(String::new());
        assert!(l.backup_url().is_none());

        l.backup_url = None;
        assert!(l.backup_url().is_none());
    }
}
