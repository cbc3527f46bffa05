//! Repository trait for redirect rules.

use crate::domain::entities::{NewRedirectRule, RedirectRule, RuleDefinition};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for a link's redirect rules.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRedirectRuleRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedirectRuleRepository: Send + Sync {
    /// Stores a new rule on a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the link does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_rule: NewRedirectRule) -> Result<RedirectRule, AppError>;

    /// Finds a rule by its database ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<RedirectRule>, AppError>;

    /// Returns a link's rules in evaluation order (ascending id).
    ///
    /// The order must be stable across calls: rule selection is
    /// first-match-wins over exactly this sequence.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_by_link(&self, link_id: i64) -> Result<Vec<RedirectRule>, AppError>;

    /// Replaces a rule's predicate and destination. Its position in the
    /// evaluation order is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the rule does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, id: i64, definition: RuleDefinition) -> Result<RedirectRule, AppError>;

    /// Deletes a rule. Returns `Ok(false)` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
