//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx
//! parameterized queries.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Links and atomic click counters
//! - [`PgClickRepository`] - Click records and analytics queries
//! - [`PgRedirectRuleRepository`] - Redirect rules in evaluation order
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_click_repository;
pub mod pg_link_repository;
pub mod pg_redirect_rule_repository;
pub mod pg_token_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_redirect_rule_repository::PgRedirectRuleRepository;
pub use pg_token_repository::PgTokenRepository;
