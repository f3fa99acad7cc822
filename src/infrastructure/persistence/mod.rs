//! Repository implementations.
//!
//! PostgreSQL is the system of record: `current_hits` must survive process
//! restarts, and the capacity reservation leans on a conditional UPDATE for
//! its atomicity. The in-memory variants serve tests and database-free
//! local runs.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] / [`MemoryLinkRepository`] - link resolution and hit reservation
//! - [`PgAccessLogRepository`] / [`MemoryAccessLogRepository`] - decision log sink

pub mod memory_access_log_repository;
pub mod memory_link_repository;
pub mod pg_access_log_repository;
pub mod pg_link_repository;

pub use memory_access_log_repository::MemoryAccessLogRepository;
pub use memory_link_repository::MemoryLinkRepository;
pub use pg_access_log_repository::PgAccessLogRepository;
pub use pg_link_repository::PgLinkRepository;
