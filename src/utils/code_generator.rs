//! Short token generation and validation.
//!
//! Generated tokens are 12 URL-safe characters drawn from the OS random
//! source. Custom tokens are accepted when they cannot collide with a
//! system route.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Length of random bytes before base64 encoding.
const TOKEN_LENGTH_BYTES: usize = 9;

const MIN_CUSTOM_LEN: usize = 4;
const MAX_CUSTOM_LEN: usize = 32;

/// Path segments served by the router itself.
const RESERVED_TOKENS: &[&str] = &["api", "health", "metrics", "admin"];

/// Generates a random short token.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
pub fn generate_token() -> Result<String, AppError> {
    let mut buffer = [0u8; TOKEN_LENGTH_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate short token",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Validates a caller-chosen short token.
///
/// Tokens are case-sensitive, 4-32 characters of ASCII letters, digits,
/// `-` and `_`, and must not shadow a reserved route.
///
/// # Errors
///
/// Returns [`AppError::Validation`] describing the first violated rule.
pub fn validate_custom_token(token: &str) -> Result<(), AppError> {
    if token.len() < MIN_CUSTOM_LEN || token.len() > MAX_CUSTOM_LEN {
        return Err(AppError::bad_request(
            format!("Custom token must be {MIN_CUSTOM_LEN}-{MAX_CUSTOM_LEN} characters"),
            json!({ "provided_length": token.len() }),
        ));
    }

    if !token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "Custom token can only contain letters, digits, hyphens and underscores",
            json!({ "token": token }),
        ));
    }

    if RESERVED_TOKENS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(token))
    {
        return Err(AppError::bad_request(
            "This token is reserved",
            json!({ "token": token }),
        ));
    }

    Ok(())
}
