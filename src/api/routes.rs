//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_link_handler, create_rule_handler, delete_link_handler, delete_rule_handler,
    get_link_handler, link_daily_handler, link_devices_handler, link_ips_handler,
    link_referers_handler, list_clicks_handler, list_links_handler, list_rules_handler,
    owner_daily_handler, recent_links_handler, totals_handler, update_rule_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /links`                           - Create a short link
/// - `GET    /links`                           - List links (paginated)
/// - `GET    /links/recent`                    - Ten most recent links
/// - `GET    /links/{id}`                      - One link
/// - `DELETE /links/{id}`                      - Delete a link
/// - `GET    /links/{id}/rules`                - Rules in evaluation order
/// - `POST   /links/{id}/rules`                - Append a rule
/// - `GET    /links/{id}/clicks`               - Click records (paginated, date range)
/// - `PUT    /rules/{id}`                      - Replace a rule
/// - `DELETE /rules/{id}`                      - Delete a rule
/// - `GET    /analytics/daily`                 - Daily clicks across all links
/// - `GET    /analytics/total`                 - Link and click totals
/// - `GET    /analytics/links/{id}/daily`      - Daily clicks of one link
/// - `GET    /analytics/links/{id}/devices`    - Clicks by device class
/// - `GET    /analytics/links/{id}/referers`   - Clicks by referer
/// - `GET    /analytics/links/{id}/ips`        - Clicks by client IP
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route("/links/recent", get(recent_links_handler))
        .route(
            "/links/{id}",
            get(get_link_handler).delete(delete_link_handler),
        )
        .route(
            "/links/{id}/rules",
            get(list_rules_handler).post(create_rule_handler),
        )
        .route("/links/{id}/clicks", get(list_clicks_handler))
        .route(
            "/rules/{id}",
            put(update_rule_handler).delete(delete_rule_handler),
        )
        .route("/analytics/daily", get(owner_daily_handler))
        .route("/analytics/total", get(totals_handler))
        .route("/analytics/links/{id}/daily", get(link_daily_handler))
        .route("/analytics/links/{id}/devices", get(link_devices_handler))
        .route("/analytics/links/{id}/referers", get(link_referers_handler))
        .route("/analytics/links/{id}/ips", get(link_ips_handler))
}
