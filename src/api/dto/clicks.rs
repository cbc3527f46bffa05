//! DTOs for click event data.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::pagination::PaginationMeta;
use crate::domain::entities::{Click, DeviceType};

/// Individual click event information.
///
/// Optional fields are omitted from JSON when `None` for cleaner responses.
#[derive(Debug, Serialize)]
pub struct ClickInfo {
    pub id: i64,
    pub clicked_at: DateTime<Utc>,
    pub device: DeviceType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl From<Click> for ClickInfo {
    fn from(c: Click) -> Self {
        Self {
            id: c.id,
            clicked_at: c.clicked_at,
            device: c.device,
            user_agent: c.user_agent,
            referer: c.referer,
            ip: c.ip,
            country: c.country,
        }
    }
}

/// Paginated clicks of one link.
#[derive(Debug, Serialize)]
pub struct ClickListResponse {
    pub link_id: i64,
    pub pagination: PaginationMeta,
    pub items: Vec<ClickInfo>,
}
