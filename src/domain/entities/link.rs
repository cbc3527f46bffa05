//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL owned by an API token holder.
///
/// `short_token` is globally unique and case-sensitive. `clicks` only ever
/// grows, through [`crate::domain::repositories::LinkRepository::increment_clicks`].
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub short_token: String,
    pub original_url: String,
    pub short_url: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub clicks: i64,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        short_token: String,
        original_url: String,
        short_url: String,
        owner_id: i64,
        created_at: DateTime<Utc>,
        clicks: i64,
    ) -> Self {
        Self {
            id,
            short_token,
            original_url,
            short_url,
            owner_id,
            created_at,
            clicks,
        }
    }

    /// Returns true if `owner_id` owns this link.
    pub fn is_owned_by(&self, owner_id: i64) -> bool {
        self.owner_id == owner_id
    }
}

/// Input data for creating a new link. The click counter starts at zero.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_token: String,
    pub original_url: String,
    pub short_url: String,
    pub owner_id: i64,
}

/// The part of a link the redirect path needs.
///
/// This is what the lookup cache stores, so it deliberately omits the click
/// counter and ownership.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LinkTarget {
    pub link_id: i64,
    pub original_url: String,
}

impl From<&Link> for LinkTarget {
    fn from(link: &Link) -> Self {
        Self {
            link_id: link.id,
            original_url: link.original_url.clone(),
        }
    }
}
