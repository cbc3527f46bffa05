//! Link creation, listing and deletion.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_token, validate_custom_token};
use crate::utils::url_normalizer::normalize_url;
use serde_json::json;

/// Loads a link and checks that `owner_id` owns it.
///
/// Links of other owners are reported exactly like missing ones.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if the link does not exist or belongs to
/// someone else.
pub(crate) async fn find_owned_link<L>(
    repository: &L,
    link_id: i64,
    owner_id: i64,
) -> Result<Link, AppError>
where
    L: LinkRepository + ?Sized,
{
    repository
        .find_by_id(link_id)
        .await?
        .filter(|link| link.is_owned_by(owner_id))
        .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": link_id })))
}

/// Service for managing an owner's short links.
pub struct LinkService<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    base_url: String,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    ///
    /// `base_url` is the public origin short URLs are built from
    /// (`BASE_URL`); a trailing slash is ignored.
    pub fn new(repository: Arc<L>, cache: Arc<dyn CacheService>, base_url: String) -> Self {
        Self {
            repository,
            cache,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a short link for `owner_id`.
    ///
    /// The URL is normalized first. With `custom_token` the token is
    /// validated and must be free; otherwise a random token is generated,
    /// retrying on collision.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid URL or custom token.
    /// Returns [`AppError::Conflict`] if the custom token is taken.
    /// Returns [`AppError::Internal`] on database errors or if no free token
    /// could be generated.
    pub async fn create_link(
        &self,
        owner_id: i64,
        original_url: &str,
        custom_token: Option<String>,
    ) -> Result<Link, AppError> {
        let original_url = normalize_url(original_url)?;

        let short_token = match custom_token {
            Some(custom) => {
                validate_custom_token(&custom)?;

                if self.repository.find_by_token(&custom).await?.is_some() {
                    return Err(AppError::conflict(
                        "Short token already exists",
                        json!({ "short_token": custom }),
                    ));
                }

                custom
            }
            None => self.generate_unique_token().await?,
        };

        let new_link = NewLink {
            short_url: self.short_url(&short_token),
            short_token,
            original_url,
            owner_id,
        };

        let link = self.repository.create(new_link).await?;
        info!(link_id = link.id, short_token = %link.short_token, owner_id, "Link created");

        Ok(link)
    }

    /// Returns one of the owner's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or is not
    /// owned by `owner_id`.
    pub async fn get_link(&self, link_id: i64, owner_id: i64) -> Result<Link, AppError> {
        find_owned_link(self.repository.as_ref(), link_id, owner_id).await
    }

    /// Returns a page of the owner's links (newest first) and the total count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_links(
        &self,
        owner_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Link>, i64), AppError> {
        let (items, total) = tokio::try_join!(
            self.repository.list_by_owner(owner_id, page, page_size),
            self.repository.count_by_owner(owner_id),
        )?;

        Ok((items, total))
    }

    /// Returns the owner's most recently created links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn recent_links(&self, owner_id: i64, limit: i64) -> Result<Vec<Link>, AppError> {
        self.repository.recent_by_owner(owner_id, limit).await
    }

    /// Deletes one of the owner's links and evicts it from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or is not
    /// owned by `owner_id`.
    pub async fn delete_link(&self, link_id: i64, owner_id: i64) -> Result<(), AppError> {
        let link = find_owned_link(self.repository.as_ref(), link_id, owner_id).await?;

        if !self.repository.delete(link_id, owner_id).await? {
            return Err(AppError::not_found("Link not found", json!({ "id": link_id })));
        }

        if let Err(e) = self.cache.invalidate(&link.short_token).await {
            warn!(short_token = %link.short_token, error = %e, "Failed to invalidate cache entry");
        }

        info!(link_id, owner_id, "Link deleted");
        Ok(())
    }

    /// Checks database connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the database is unreachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Builds the public short URL for a token.
    pub fn short_url(&self, short_token: &str) -> String {
        format!("{}/{}", self.base_url, short_token)
    }

    /// Generates a token not yet in use. Attempts up to 10 times.
    async fn generate_unique_token(&self) -> Result<String, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        for _ in 0..MAX_ATTEMPTS {
            let token = generate_token()?;

            if self.repository.find_by_token(&token).await?.is_none() {
                return Ok(token);
            }
        }

        Err(AppError::internal(
            "Failed to generate unique short token",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}
