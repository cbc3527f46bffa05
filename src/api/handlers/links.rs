//! Handlers for link management endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, LinkListResponse, LinkResponse};
use crate::api::dto::pagination::PaginationParams;
use crate::api::middleware::Owner;
use crate::error::AppError;
use crate::state::AppState;

/// Number of links returned by the "recent" listing.
const RECENT_LINKS: i64 = 10;

/// Creates a short link for the caller.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/page", "custom_token": "promo-2026" }
/// ```
///
/// `custom_token` is optional; without it a random 12-character token is
/// generated.
///
/// # Errors
///
/// Returns 400 Bad Request if the URL or custom token is invalid.
/// Returns 409 Conflict if the custom token is already taken.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(owner_id, &payload.url, payload.custom_token)
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/links?page=1&page_size=25`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let page = params.validate()?;

    let (links, total) = state
        .link_service
        .list_links(owner_id, i64::from(page.page), page.limit())
        .await?;

    Ok(Json(LinkListResponse {
        pagination: page.meta(total),
        items: links.into_iter().map(LinkResponse::from).collect(),
    }))
}

/// Returns the caller's ten most recently created links.
///
/// # Endpoint
///
/// `GET /api/links/recent`
pub async fn recent_links_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = state
        .link_service
        .recent_links(owner_id, RECENT_LINKS)
        .await?;

    Ok(Json(links.into_iter().map(LinkResponse::from).collect()))
}

/// Returns one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/links/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or belongs to another
/// token.
pub async fn get_link_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Path(link_id): Path<i64>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(link_id, owner_id).await?;
    Ok(Json(link.into()))
}

/// Deletes one of the caller's links together with its clicks and rules.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// The cached lookup for the link's token is evicted, so the token stops
/// resolving immediately.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or belongs to another
/// token.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Path(link_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(link_id, owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
