//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{short_token}` - Short link redirect (public)
//! - `GET  /health`        - Health check: database and cache (public)
//! - `/api/*`              - Management API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token on `/api`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the production router: all routes, rate limits and trailing
/// slash normalization.
///
/// Client IPs for rate limiting follow `state.behind_proxy`.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, true))
}

/// All routes with tracing and authentication. Rate limits are applied
/// only when `rate_limited` is set.
pub fn router(state: AppState, rate_limited: bool) -> Router {
    let behind_proxy = state.behind_proxy;

    let mut api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let mut public_router = Router::new()
        .route("/health", get(health_handler))
        .route("/{short_token}", get(redirect_handler));

    if rate_limited {
        api_router = api_router.layer(rate_limit::secure_layer(behind_proxy));
        public_router = public_router.layer(rate_limit::layer(behind_proxy));
    }

    Router::new()
        .merge(public_router)
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
}
