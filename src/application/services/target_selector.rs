//! Weighted, capacity-aware target selection.

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::domain::entities::{Link, Target};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Result of a selection pass over a link's target pool.
#[derive(Debug, Clone)]
pub enum Selection {
    /// A target was chosen and one unit of its capacity reserved.
    Target(Target),
    /// Nothing is eligible; the caller falls back to the backup URL.
    Backup,
}

/// Picks a destination among a link's eligible targets.
///
/// Eligibility filters on activity, remaining capacity, and country match;
/// the draw is a cumulative-weight walk over the eligible set in ascending
/// id order, so selection frequency converges to `weight / Σweight`. The
/// winning target's capacity is consumed through the repository's atomic
/// reservation; losing that race excludes the target and redraws, which
/// keeps `current_hits` at or under a positive cap no matter how many
/// requests run concurrently.
///
/// The random source is owned and seedable so distribution tests can run
/// reproducibly.
pub struct TargetSelector {
    repo: Arc<dyn LinkRepository>,
    rng: Mutex<StdRng>,
}

impl TargetSelector {
    /// Creates a selector with an OS-seeded random source.
    pub fn new(repo: Arc<dyn LinkRepository>) -> Self {
        Self {
            repo,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a selector with a deterministic random source.
    pub fn with_seed(repo: Arc<dyn LinkRepository>, seed: u64) -> Self {
        Self {
            repo,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Selects a target for a request classified as `country`.
    ///
    /// # Errors
    ///
    /// Propagates store errors from the capacity reservation; filtering and
    /// drawing are infallible.
    pub async fn select(
        &self,
        link: &Link,
        country: Option<&str>,
    ) -> Result<Selection, AppError> {
        let mut excluded: HashSet<i64> = HashSet::new();

        loop {
            let mut eligible: Vec<&Target> = link
                .targets
                .iter()
                .filter(|t| !excluded.contains(&t.id))
                .filter(|t| t.is_eligible(country))
                .collect();
            eligible.sort_by_key(|t| t.id);

            if eligible.is_empty() {
                return Ok(Selection::Backup);
            }

            let chosen = self.pick_weighted(&eligible);

            if self.repo.reserve_target_hit(chosen.id).await? {
                return Ok(Selection::Target(chosen.clone()));
            }

            // Lost the reservation race (a concurrent request took the last
            // capacity unit), drop the target and draw again
            excluded.insert(chosen.id);
        }
    }

    /// Consumes one unit of `target`'s capacity without a new draw.
    ///
    /// Used for sticky reuse so every served redirect passes the same
    /// capacity gate as a fresh selection.
    pub async fn reserve(&self, target: &Target) -> Result<bool, AppError> {
        self.repo.reserve_target_hit(target.id).await
    }

    /// Cumulative-weight draw over `eligible`, which must be non-empty and
    /// sorted by id.
    ///
    /// A zero-weight target is unreachable while any positive weight is
    /// present; when every weight is zero the choice is uniform.
    fn pick_weighted<'a>(&self, eligible: &[&'a Target]) -> &'a Target {
        let mut rng = self.rng.lock().expect("selector rng lock poisoned");

        let total: i64 = eligible.iter().map(|t| i64::from(t.weight.max(0))).sum();
        if total == 0 {
            return eligible[rng.random_range(0..eligible.len())];
        }

        let mut draw = rng.random_range(0..total);
        for target in eligible {
            draw -= i64::from(target.weight.max(0));
            if draw < 0 {
                return target;
            }
        }

        eligible[eligible.len() - 1]
    }
}
