//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod analytics;
pub mod clicks;
pub mod health;
pub mod links;
pub mod redirect;
pub mod rules;

pub use analytics::{
    link_daily_handler, link_devices_handler, link_ips_handler, link_referers_handler,
    owner_daily_handler, totals_handler,
};
pub use clicks::list_clicks_handler;
pub use health::health_handler;
pub use links::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
    recent_links_handler,
};
pub use redirect::redirect_handler;
pub use rules::{create_rule_handler, delete_rule_handler, list_rules_handler, update_rule_handler};
