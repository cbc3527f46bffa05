//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::pagination::PaginationMeta;
use crate::domain::entities::Link;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    #[validate(length(max = 2048, message = "URL is too long"))]
    pub url: String,

    /// Optional custom short token; checked for length and characters by
    /// the link service.
    #[validate(length(min = 1, max = 64))]
    pub custom_token: Option<String>,
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub short_token: String,
    pub short_url: String,
    pub original_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            short_token: link.short_token,
            short_url: link.short_url,
            original_url: link.original_url,
            clicks: link.clicks,
            created_at: link.created_at,
        }
    }
}

/// Paginated list of links.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<LinkResponse>,
}
