//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use tracing::warn;

use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw API token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex string. The server and the admin
/// CLI must both use this function so stored hashes stay verifiable.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    // HMAC is defined for keys of any length.
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Service for authenticating API requests via Bearer tokens.
///
/// The id of the matching token is the caller's owner identity.
pub struct AuthService<R: TokenRepository + ?Sized> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository + ?Sized> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when tokens were created.
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Authenticates a raw token and returns the owner id it maps to.
    ///
    /// A successful call also bumps the token's `last_used_at`; failing to do
    /// so is logged and does not reject the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<i64, AppError> {
        let token_hash = hash_token(&self.signing_secret, token);

        let Some(owner_id) = self.repository.validate_token(&token_hash).await? else {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Invalid or revoked token" }),
            ));
        };

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            warn!(owner_id, error = %e, "Failed to update token last_used_at");
        }

        Ok(owner_id)
    }
}
