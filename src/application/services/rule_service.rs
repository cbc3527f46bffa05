//! Redirect rule management.

use std::sync::Arc;

use axum::http::HeaderName;
use regex::Regex;
use serde_json::json;
use tracing::info;

use crate::application::services::link_service::find_owned_link;
use crate::domain::entities::{
    MatchMethod, NewRedirectRule, RedirectRule, RuleDefinition, TargetType,
};
use crate::domain::repositories::{LinkRepository, RedirectRuleRepository};
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

/// Service for creating and editing the redirect rules of a link.
///
/// Rules are evaluated in the order returned by [`Self::list_rules`]; new
/// rules go to the end.
pub struct RuleService<R: RedirectRuleRepository + ?Sized, L: LinkRepository + ?Sized> {
    rules: Arc<R>,
    links: Arc<L>,
}

impl<R, L> RuleService<R, L>
where
    R: RedirectRuleRepository + ?Sized,
    L: LinkRepository + ?Sized,
{
    pub fn new(rules: Arc<R>, links: Arc<L>) -> Self {
        Self { rules, links }
    }

    /// Lists a link's rules in evaluation order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or is not
    /// owned by `owner_id`.
    pub async fn list_rules(
        &self,
        link_id: i64,
        owner_id: i64,
    ) -> Result<Vec<RedirectRule>, AppError> {
        find_owned_link(self.links.as_ref(), link_id, owner_id).await?;
        self.rules.list_by_link(link_id).await
    }

    /// Appends a rule to a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the definition is invalid (see
    /// [`validate_definition`]).
    /// Returns [`AppError::NotFound`] if the link does not exist or is not
    /// owned by `owner_id`.
    pub async fn create_rule(
        &self,
        link_id: i64,
        owner_id: i64,
        definition: RuleDefinition,
    ) -> Result<RedirectRule, AppError> {
        let definition = validate_definition(definition)?;
        find_owned_link(self.links.as_ref(), link_id, owner_id).await?;

        let rule = self
            .rules
            .create(NewRedirectRule {
                link_id,
                definition,
            })
            .await?;

        info!(rule_id = rule.id, link_id, "Redirect rule created");
        Ok(rule)
    }

    /// Replaces a rule's predicate and destination.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the definition is invalid.
    /// Returns [`AppError::NotFound`] if the rule does not exist or its link
    /// is not owned by `owner_id`.
    pub async fn update_rule(
        &self,
        rule_id: i64,
        owner_id: i64,
        definition: RuleDefinition,
    ) -> Result<RedirectRule, AppError> {
        let definition = validate_definition(definition)?;
        self.find_owned_rule(rule_id, owner_id).await?;

        let rule = self.rules.update(rule_id, definition).await?;
        info!(rule_id, link_id = rule.link_id, "Redirect rule updated");
        Ok(rule)
    }

    /// Deletes a rule.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the rule does not exist or its link
    /// is not owned by `owner_id`.
    pub async fn delete_rule(&self, rule_id: i64, owner_id: i64) -> Result<(), AppError> {
        self.find_owned_rule(rule_id, owner_id).await?;

        if !self.rules.delete(rule_id).await? {
            return Err(rule_not_found(rule_id));
        }

        info!(rule_id, "Redirect rule deleted");
        Ok(())
    }

    async fn find_owned_rule(&self, rule_id: i64, owner_id: i64) -> Result<RedirectRule, AppError> {
        let rule = self
            .rules
            .find_by_id(rule_id)
            .await?
            .ok_or_else(|| rule_not_found(rule_id))?;

        find_owned_link(self.links.as_ref(), rule.link_id, owner_id)
            .await
            .map_err(|_| rule_not_found(rule_id))?;

        Ok(rule)
    }
}

fn rule_not_found(rule_id: i64) -> AppError {
    AppError::not_found("Redirect rule not found", json!({ "id": rule_id }))
}

/// Checks a rule definition before it is stored.
///
/// - the destination must be an absolute http(s) URL; it is normalized
/// - a header rule's name must be a valid HTTP header name
/// - a `regex` operand must compile
///
/// A missing name or value is accepted: such a rule is stored but never
/// matches until it is completed.
///
/// # Errors
///
/// Returns [`AppError::Validation`] naming the offending field.
pub fn validate_definition(mut definition: RuleDefinition) -> Result<RuleDefinition, AppError> {
    definition.redirect_url = normalize_url(&definition.redirect_url).map_err(|e| {
        AppError::bad_request(
            "Invalid redirect_url",
            json!({ "field": "redirect_url", "reason": e.to_string() }),
        )
    })?;

    if definition.target_type == TargetType::Header
        && let Some(name) = &definition.target_name
        && HeaderName::from_bytes(name.as_bytes()).is_err()
    {
        return Err(AppError::bad_request(
            "Invalid header name",
            json!({ "field": "target_name", "value": name }),
        ));
    }

    if definition.method == MatchMethod::Regex
        && let Some(pattern) = &definition.target_value
        && let Err(e) = Regex::new(pattern)
    {
        return Err(AppError::bad_request(
            "Invalid regular expression",
            json!({ "field": "target_value", "reason": e.to_string() }),
        ));
    }

    Ok(definition)
}
