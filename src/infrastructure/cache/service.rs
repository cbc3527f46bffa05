//! Cache service trait and error types.

use async_trait::async_trait;

use crate::domain::entities::LinkTarget;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache of `short token -> LinkTarget` used by the redirect path.
///
/// Only the link id and original URL are cached. Click counters and redirect
/// rules are always read from the database, so rule edits take effect on the
/// next request.
///
/// Implementations must be fail-open: backend errors are logged and surface
/// as misses, never as request failures.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Looks up a cached link target.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(target))` on cache hit
    /// - `Ok(None)` on cache miss or backend error
    async fn get_link(&self, short_token: &str) -> CacheResult<Option<LinkTarget>>;

    /// Stores a link target, using the implementation's default TTL when
    /// `ttl_seconds` is `None`.
    async fn set_link(
        &self,
        short_token: &str,
        target: &LinkTarget,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes a cached entry. Called when a link is deleted.
    async fn invalidate(&self, short_token: &str) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;
}
