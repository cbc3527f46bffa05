//! Redis-backed link target cache.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::LinkTarget;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

const KEY_PREFIX: &str = "link:";

/// Redis cache storing [`LinkTarget`] values as JSON under `link:<token>`.
///
/// Uses a `ConnectionManager` for reconnects and connection reuse. All
/// operations are fail-open.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis and verifies the connection with a PING.
    ///
    /// `default_ttl_seconds` applies when [`CacheService::set_link`] is
    /// called without an explicit TTL (`CACHE_TTL_SECONDS`).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
        })
    }

    fn build_key(short_token: &str) -> String {
        format!("{KEY_PREFIX}{short_token}")
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_link(&self, short_token: &str) -> CacheResult<Option<LinkTarget>> {
        let key = Self::build_key(short_token);
        let mut conn = self.client.clone();

        let raw = match conn.get::<_, Option<String>>(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(short_token, error = %e, "Redis GET failed");
                return Ok(None);
            }
        };

        let Some(raw) = raw else {
            debug!(short_token, "Cache MISS");
            return Ok(None);
        };

        match serde_json::from_str::<LinkTarget>(&raw) {
            Ok(target) => {
                debug!(short_token, link_id = target.link_id, "Cache HIT");
                Ok(Some(target))
            }
            Err(e) => {
                warn!(short_token, error = %e, "Discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    async fn set_link(
        &self,
        short_token: &str,
        target: &LinkTarget,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let key = Self::build_key(short_token);
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        let value = serde_json::to_string(target)
            .map_err(|e| CacheError::OperationError(e.to_string()))?;
        let mut conn = self.client.clone();

        match conn.set_ex::<_, _, ()>(&key, value, ttl).await {
            Ok(()) => debug!(short_token, ttl, "Cache SET"),
            Err(e) => warn!(short_token, error = %e, "Redis SET failed"),
        }

        Ok(())
    }

    async fn invalidate(&self, short_token: &str) -> CacheResult<()> {
        let key = Self::build_key(short_token);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&key).await {
            Ok(deleted) if deleted > 0 => debug!(short_token, "Cache INVALIDATE"),
            Ok(_) => {}
            Err(e) => warn!(short_token, error = %e, "Redis DEL failed"),
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
