//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for persistence, caching, sticky assignments,
//! admission control, and geo lookup. Every Redis-backed component has an
//! in-process fallback so the service runs without Redis.
//!
//! # Modules
//!
//! - [`cache`] - Link definition caching (Redis and no-op implementations)
//! - [`geo`] - Client IP to country resolution
//! - [`persistence`] - PostgreSQL and in-memory repositories
//! - [`ratelimit`] - Per-client admission control
//! - [`sticky`] - Remembered IP-to-target assignments

pub mod cache;
pub mod geo;
pub mod persistence;
pub mod ratelimit;
pub mod sticky;
