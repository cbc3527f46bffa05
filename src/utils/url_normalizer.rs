//! Destination URL normalization.
//!
//! Every URL a redirect may point to (a link's original URL or a rule's
//! destination) passes through [`normalize_url`] before it is stored.

use serde_json::json;
use url::Url;

use crate::error::AppError;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS URLs can be redirect targets")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

impl From<UrlNormalizationError> for AppError {
    fn from(e: UrlNormalizationError) -> Self {
        AppError::bad_request(e.to_string(), json!({}))
    }
}

/// Normalizes a redirect destination to a canonical form.
///
/// - only `http` and `https` are accepted
/// - the host is lowercased and default ports are dropped
/// - fragments are removed
/// - path and query are preserved as given
///
/// # Errors
///
/// Returns [`UrlNormalizationError`] for malformed URLs, other schemes
/// (`javascript:`, `data:`, `ftp:`...), or URLs without a host.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("HTTPS://EXAMPLE.COM:443/Path#top").unwrap(),
///     "https://example.com/Path"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let mut url = Url::parse(input.trim())
        .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(UrlNormalizationError::MissingHost)?
        .to_ascii_lowercase();
    url.set_host(Some(&host)).map_err(|_| {
        UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
    })?;

    url.set_fragment(None);

    if matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url.to_string())
}
