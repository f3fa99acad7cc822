//! Core domain entities representing the redirect data model.
//!
//! Entities mirror the rows materialized by the external control plane and
//! are read-only to the decision flow, with one exception: per-target
//! `current_hits`, which only the repository's atomic reservation mutates.
//!
//! # Entity Types
//!
//! - [`Link`] - A short-code entry owning a pool of targets
//! - [`Target`] - A weighted, capacity- and geography-constrained destination

pub mod link;
pub mod target;

pub use link::Link;
pub use target::Target;
