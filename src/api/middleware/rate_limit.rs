//! Rate limiting middleware using token bucket algorithm.

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::net::SocketAddr;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder, key_extractor::KeyExtractor,
};

use crate::utils::client_ip::client_ip;

/// Rate-limit key: the client IP.
///
/// Uses the socket peer address, or the forwarding headers when
/// `behind_proxy` is set (see [`client_ip`]).
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor {
    behind_proxy: bool,
}

impl ClientIpKeyExtractor {
    pub fn new(behind_proxy: bool) -> Self {
        Self { behind_proxy }
    }
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = String;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        client_ip(req.headers(), peer, self.behind_proxy).ok_or(GovernorError::UnableToExtractKey)
    }
}

type ClientIpGovernor =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// How often idle per-IP buckets are dropped from the limiter map.
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// `replenish_secs` is the time it takes to earn back one request.
fn build(behind_proxy: bool, replenish_secs: u64, burst_size: u32) -> ClientIpGovernor {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor::new(behind_proxy))
            .per_second(replenish_secs)
            .burst_size(burst_size)
            .finish()
            .expect("rate limit period and burst are non-zero"),
    );

    // Keys may come from X-Forwarded-For, so the map must not grow forever.
    let limiter = Arc::downgrade(governor_conf.limiter());
    std::thread::spawn(move || prune_until_dropped(limiter, PRUNE_INTERVAL));

    GovernorLayer::new(governor_conf)
}

type ClientIpLimiter = governor::RateLimiter<
    String,
    governor::state::keyed::DefaultKeyedStateStore<String>,
    governor::clock::DefaultClock,
    NoOpMiddleware<QuantaInstant>,
>;

fn prune_until_dropped(limiter: Weak<ClientIpLimiter>, interval: Duration) {
    loop {
        std::thread::sleep(interval);
        let Some(limiter) = limiter.upgrade() else {
            break;
        };
        limiter.retain_recent();
        tracing::trace!(keys = limiter.len(), "Pruned rate limiter state");
    }
}

/// Creates a rate limiter for public endpoints (redirects, health).
///
/// # Limits
///
/// - **Burst**: 100 requests per client IP
/// - **Replenish**: one request every 2 seconds
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer(behind_proxy: bool) -> ClientIpGovernor {
    build(behind_proxy, 2, 100)
}

/// Creates a stricter rate limiter for the authenticated management API.
///
/// # Limits
///
/// - **Burst**: 20 requests per client IP
/// - **Replenish**: one request per second
pub fn secure_layer(behind_proxy: bool) -> ClientIpGovernor {
    build(behind_proxy, 1, 20)
}
