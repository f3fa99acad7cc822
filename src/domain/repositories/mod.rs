//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; concrete implementations
//! live in `crate::infrastructure::persistence`. Mock implementations are
//! auto-generated via `mockall` for unit tests.

pub mod access_log_repository;
pub mod link_repository;

pub use access_log_repository::AccessLogRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use access_log_repository::MockAccessLogRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
