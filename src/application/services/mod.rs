//! Business logic services for the application layer.

pub mod link_registry;
pub mod param_transformer;
pub mod redirect_service;
pub mod target_selector;

pub use link_registry::LinkRegistry;
pub use redirect_service::{RedirectOutcome, RedirectService};
pub use target_selector::{Selection, TargetSelector};
