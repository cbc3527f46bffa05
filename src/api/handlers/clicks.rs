//! Handler for a link's click records.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::api::dto::clicks::{ClickInfo, ClickListResponse};
use crate::api::dto::pagination::ClickQueryParams;
use crate::api::middleware::Owner;
use crate::domain::repositories::ClickFilter;
use crate::error::AppError;
use crate::state::AppState;

/// Lists a link's clicks, newest first.
///
/// # Endpoint
///
/// `GET /api/links/{id}/clicks`
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `page_size` (optional): Items per page (default: 25, max: 100)
/// - `from` (optional): Start time, inclusive (RFC3339)
/// - `to` (optional): End time, exclusive (RFC3339)
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or belongs to another
/// token. Returns 400 Bad Request for invalid paging or dates.
pub async fn list_clicks_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Path(link_id): Path<i64>,
    Query(params): Query<ClickQueryParams>,
) -> Result<Json<ClickListResponse>, AppError> {
    let page = params.pagination.validate()?;
    let range = params.date_filter.to_range()?;

    let filter = ClickFilter::new(page.offset(), page.limit()).with_range(range);

    let (clicks, total) = state
        .stats_service
        .list_clicks(link_id, owner_id, filter)
        .await?;

    Ok(Json(ClickListResponse {
        link_id,
        pagination: page.meta(total),
        items: clicks.into_iter().map(ClickInfo::from).collect(),
    }))
}
