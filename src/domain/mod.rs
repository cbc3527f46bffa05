//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`matcher`] - Predicate matching for a single observed value
//! - [`rule_selector`] - Header-then-cookie, first-match-wins rule selection
//! - [`request_context`] - Request data consumed by redirect resolution
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Rule matching is pure and synchronous; orchestration lives in
//!   [`crate::application::services::RedirectService`]

pub mod entities;
pub mod matcher;
pub mod repositories;
pub mod request_context;
pub mod rule_selector;
