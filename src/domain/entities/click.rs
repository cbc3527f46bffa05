//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse device class derived from the user agent at record time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Bot,
    Other,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Bot => "bot",
            DeviceType::Other => "other",
        }
    }

    /// Parses a stored device tag. Unknown tags collapse to [`DeviceType::Other`].
    pub fn from_db(value: &str) -> Self {
        match value {
            "desktop" => DeviceType::Desktop,
            "mobile" => DeviceType::Mobile,
            "bot" => DeviceType::Bot,
            _ => DeviceType::Other,
        }
    }
}

/// A click recorded when a short link is resolved.
///
/// Append-only: clicks are never updated or deleted by the redirect path.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
    pub country: Option<String>,
    pub device: DeviceType,
}

/// Input data for recording a new click.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
    pub country: Option<String>,
    pub device: DeviceType,
}
