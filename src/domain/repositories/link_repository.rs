//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// Besides owner-scoped CRUD this carries the two collaborator operations
/// the redirect path depends on: [`find_by_token`](Self::find_by_token) and
/// [`increment_clicks`](Self::increment_clicks).
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link with a zero click counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short token is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short token. Tokens are compared case-sensitively.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_token(&self, short_token: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by its database ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Lists an owner's links, newest first.
    ///
    /// # Arguments
    ///
    /// - `page` - Page number (1-indexed)
    /// - `page_size` - Number of items per page
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_by_owner(
        &self,
        owner_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Link>, AppError>;

    /// Returns the owner's `limit` most recently created links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn recent_by_owner(&self, owner_id: i64, limit: i64) -> Result<Vec<Link>, AppError>;

    /// Counts an owner's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, AppError>;

    /// Deletes a link owned by `owner_id`. Its clicks and rules go with it.
    ///
    /// Returns `Ok(false)` when no such link exists for that owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool, AppError>;

    /// Adds one to the link's click counter in a single storage-side update.
    ///
    /// Concurrent calls for the same link must never lose an increment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link no longer exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn increment_clicks(&self, link_id: i64) -> Result<(), AppError>;

    /// Checks that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the store cannot be reached.
    async fn ping(&self) -> Result<(), AppError>;
}
