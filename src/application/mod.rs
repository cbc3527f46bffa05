//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation, and ownership checks,
//! and give HTTP handlers a narrow API.
//!
//! # Available Services
//!
//! - [`services::RedirectService`] - Short link resolution with redirect rules
//! - [`services::ClickRecorder`] - Click capture with device classification
//! - [`services::LinkService`] - Short link creation, listing and deletion
//! - [`services::RuleService`] - Redirect rule management
//! - [`services::StatsService`] - Click listing and analytics
//! - [`services::AuthService`] - API token authentication

pub mod services;
