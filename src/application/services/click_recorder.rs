//! Click recording for resolved short links.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use woothee::parser::Parser;

use crate::domain::entities::{Click, DeviceType, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::domain::request_context::RequestContext;
use crate::error::AppError;

/// Request metadata stored with a click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickMetadata {
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
    /// Defaults to the time of recording when absent.
    pub clicked_at: Option<DateTime<Utc>>,
}

impl From<&RequestContext> for ClickMetadata {
    fn from(ctx: &RequestContext) -> Self {
        Self {
            user_agent: ctx.user_agent.clone(),
            referer: ctx.referer.clone(),
            ip: ctx.ip.clone(),
            clicked_at: None,
        }
    }
}

/// Maps a user agent to a coarse device class.
pub fn classify_device(user_agent: Option<&str>) -> DeviceType {
    let Some(ua) = user_agent.filter(|ua| !ua.trim().is_empty()) else {
        return DeviceType::Other;
    };

    match Parser::new().parse(ua).map(|r| r.category) {
        Some("pc") => DeviceType::Desktop,
        Some("smartphone" | "mobilephone") => DeviceType::Mobile,
        Some("crawler") => DeviceType::Bot,
        _ => DeviceType::Other,
    }
}

/// Appends one click per resolution. No deduplication.
pub struct ClickRecorder<C: ClickRepository + ?Sized> {
    repository: Arc<C>,
}

impl<C: ClickRepository + ?Sized> ClickRecorder<C> {
    pub fn new(repository: Arc<C>) -> Self {
        Self { repository }
    }

    /// Stores a click for `link_id`, deriving the device class from the user
    /// agent. Country is left empty.
    ///
    /// # Errors
    ///
    /// Propagates repository errors unchanged.
    pub async fn record(&self, link_id: i64, metadata: ClickMetadata) -> Result<Click, AppError> {
        let device = classify_device(metadata.user_agent.as_deref());

        let new_click = NewClick {
            link_id,
            clicked_at: metadata.clicked_at.unwrap_or_else(Utc::now),
            user_agent: metadata.user_agent,
            referer: metadata.referer,
            ip: metadata.ip,
            country: None,
            device,
        };

        self.repository.create_click(new_click).await
    }
}
