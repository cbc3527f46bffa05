//! Business logic services for the application layer.

pub mod auth_service;
pub mod click_recorder;
pub mod link_service;
pub mod redirect_service;
pub mod rule_service;
pub mod stats_service;

pub use auth_service::AuthService;
pub use click_recorder::{ClickMetadata, ClickRecorder};
pub use link_service::LinkService;
pub use redirect_service::{RedirectOutcome, RedirectService, ResolveError};
pub use rule_service::RuleService;
pub use stats_service::{Breakdown, StatsService};
