//! No-op cache used when `REDIS_URL` is not configured.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::LinkTarget;
use async_trait::async_trait;
use tracing::debug;

/// A cache that never stores anything; every lookup is a miss.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_link(&self, _short_token: &str) -> CacheResult<Option<LinkTarget>> {
        Ok(None)
    }

    async fn set_link(
        &self,
        _short_token: &str,
        _target: &LinkTarget,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _short_token: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
