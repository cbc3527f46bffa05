//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access and are implemented by the
//! infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short links and their click counters
//! - [`ClickRepository`] - Click records and analytics
//! - [`RedirectRuleRepository`] - Conditional redirect rules
//! - [`TokenRepository`] - API token authentication

pub mod click_repository;
pub mod link_repository;
pub mod redirect_rule_repository;
pub mod token_repository;

pub use click_repository::{
    ClickFilter, ClickRepository, DailyCount, DateRange, GroupCount, OwnerTotals,
};
pub use link_repository::LinkRepository;
pub use redirect_rule_repository::RedirectRuleRepository;
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use redirect_rule_repository::MockRedirectRuleRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
