//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;

use crate::domain::request_context::RequestContext;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Resolves a short token and redirects the client.
///
/// # Endpoint
///
/// `GET /{short_token}`
///
/// # Request Flow
///
/// 1. Capture headers, cookies, client IP, user agent and referer
/// 2. Look the link up (cache first, then database)
/// 3. Record a click and increment the link's counter
/// 4. Evaluate the link's redirect rules: headers first, then cookies
/// 5. Return `302 Found` to the first matching rule's URL, or to the
///    link's original URL when none match
///
/// # Errors
///
/// Returns 404 Not Found if the short token doesn't exist.
/// Returns 500 if the counter increment or rule retrieval fails.
pub async fn redirect_handler(
    Path(short_token): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let ip = client_ip(&headers, Some(addr), state.behind_proxy);
    let ctx = RequestContext::new(headers, ip);

    let outcome = state.redirect_service.resolve(&short_token, &ctx).await?;

    let location = HeaderValue::try_from(outcome.location()).map_err(|_| {
        AppError::internal(
            "Stored redirect URL is not a valid header value",
            json!({ "short_token": short_token }),
        )
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
