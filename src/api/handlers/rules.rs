//! Handlers for redirect rule endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::rules::{RuleListResponse, RuleRequest, RuleResponse};
use crate::api::middleware::Owner;
use crate::error::AppError;
use crate::state::AppState;

/// Lists a link's rules in evaluation order.
///
/// # Endpoint
///
/// `GET /api/links/{id}/rules`
pub async fn list_rules_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Path(link_id): Path<i64>,
) -> Result<Json<RuleListResponse>, AppError> {
    let rules = state.rule_service.list_rules(link_id, owner_id).await?;

    Ok(Json(RuleListResponse {
        link_id,
        items: rules.into_iter().map(RuleResponse::from).collect(),
    }))
}

/// Adds a rule to a link. New rules are evaluated after existing ones.
///
/// # Endpoint
///
/// `POST /api/links/{id}/rules`
///
/// # Request Body
///
/// ```json
/// {
///   "target_type": "header",
///   "target_name": "Accept-Language",
///   "target_method": "startsWith",
///   "target_value": "de",
///   "redirect_url": "https://example.de"
/// }
/// ```
///
/// `target_method` is one of `match`, `regex`, `contains`, `startsWith`,
/// `endsWith`.
///
/// # Errors
///
/// Returns 400 Bad Request for an invalid URL, header name or regex.
/// Returns 404 Not Found if the link doesn't exist or belongs to another
/// token.
pub async fn create_rule_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Path(link_id): Path<i64>,
    Json(payload): Json<RuleRequest>,
) -> Result<(StatusCode, Json<RuleResponse>), AppError> {
    payload.validate()?;

    let rule = state
        .rule_service
        .create_rule(link_id, owner_id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(rule.into())))
}

/// Replaces a rule's predicate and destination. Its position is kept.
///
/// # Endpoint
///
/// `PUT /api/rules/{id}`
pub async fn update_rule_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Path(rule_id): Path<i64>,
    Json(payload): Json<RuleRequest>,
) -> Result<Json<RuleResponse>, AppError> {
    payload.validate()?;

    let rule = state
        .rule_service
        .update_rule(rule_id, owner_id, payload.into())
        .await?;

    Ok(Json(rule.into()))
}

/// Deletes a rule.
///
/// # Endpoint
///
/// `DELETE /api/rules/{id}`
pub async fn delete_rule_handler(
    State(state): State<AppState>,
    Extension(Owner(owner_id)): Extension<Owner>,
    Path(rule_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.rule_service.delete_rule(rule_id, owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
