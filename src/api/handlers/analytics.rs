//! Handlers for click analytics.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::api::dto::analytics::{BreakdownResponse, DailyResponse};
use crate::api::dto::pagination::DateFilterParams;
use crate::api::middleware::Owner;
use crate::application::services::Breakdown;
use crate::domain::repositories::OwnerTotals;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/analytics/links/{id}/daily?from&to`
pub async fn link_daily_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Path(link_id): Path<i64>,
    Query(params): Query<DateFilterParams>,
) -> Result<Json<DailyResponse>, AppError> {
    let range = params.to_range()?;
    let items = state
        .stats_service
        .daily_for_link(link_id, owner_id, range)
        .await?;

    Ok(Json(DailyResponse::new(Some(link_id), items)))
}

/// `GET /api/analytics/daily?from&to`, summed over all of the caller's links.
pub async fn owner_daily_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Query(params): Query<DateFilterParams>,
) -> Result<Json<DailyResponse>, AppError> {
    let range = params.to_range()?;
    let items = state.stats_service.daily_for_owner(owner_id, range).await?;

    Ok(Json(DailyResponse::new(None, items)))
}

/// `GET /api/analytics/links/{id}/devices?from&to`
pub async fn link_devices_handler(
    state: State<AppState>,
    owner: Extension<Owner>,
    link_id: Path<i64>,
    params: Query<DateFilterParams>,
) -> Result<Json<BreakdownResponse>, AppError> {
    breakdown(state, owner, link_id, params, Breakdown::Device).await
}

/// `GET /api/analytics/links/{id}/referers?from&to`
pub async fn link_referers_handler(
    state: State<AppState>,
    owner: Extension<Owner>,
    link_id: Path<i64>,
    params: Query<DateFilterParams>,
) -> Result<Json<BreakdownResponse>, AppError> {
    breakdown(state, owner, link_id, params, Breakdown::Referer).await
}

/// `GET /api/analytics/links/{id}/ips?from&to`
pub async fn link_ips_handler(
    state: State<AppState>,
    owner: Extension<Owner>,
    link_id: Path<i64>,
    params: Query<DateFilterParams>,
) -> Result<Json<BreakdownResponse>, AppError> {
    breakdown(state, owner, link_id, params, Breakdown::Ip).await
}

async fn breakdown(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Path(link_id): Path<i64>,
    Query(params): Query<DateFilterParams>,
    by: Breakdown,
) -> Result<Json<BreakdownResponse>, AppError> {
    let range = params.to_range()?;
    let items = state
        .stats_service
        .breakdown(link_id, owner_id, by, range)
        .await?;

    Ok(Json(BreakdownResponse {
        link_id,
        by: by.as_str(),
        items,
    }))
}

/// `GET /api/analytics/total`
pub async fn totals_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
) -> Result<Json<OwnerTotals>, AppError> {
    Ok(Json(state.stats_service.totals(owner_id).await?))
}
