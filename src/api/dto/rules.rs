//! DTOs for redirect rule endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{MatchMethod, RedirectRule, RuleDefinition, TargetType};

/// Body of rule create and replace requests.
///
/// `target_name` and `target_value` may be omitted; such a rule is stored but
/// never matches.
#[derive(Debug, Deserialize, Validate)]
pub struct RuleRequest {
    pub target_type: TargetType,

    #[validate(length(min = 1, max = 256))]
    pub target_name: Option<String>,

    pub target_method: MatchMethod,

    #[validate(length(max = 2048))]
    pub target_value: Option<String>,

    #[validate(url(message = "Invalid redirect URL"))]
    #[validate(length(max = 2048, message = "Redirect URL is too long"))]
    pub redirect_url: String,
}

impl From<RuleRequest> for RuleDefinition {
    fn from(req: RuleRequest) -> Self {
        Self {
            target_type: req.target_type,
            target_name: req.target_name,
            method: req.target_method,
            target_value: req.target_value,
            redirect_url: req.redirect_url,
        }
    }
}

/// JSON representation of a rule.
#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub id: i64,
    pub link_id: i64,
    pub target_type: TargetType,
    pub target_name: Option<String>,
    pub target_method: MatchMethod,
    pub target_value: Option<String>,
    pub redirect_url: String,
}

impl From<RedirectRule> for RuleResponse {
    fn from(rule: RedirectRule) -> Self {
        Self {
            id: rule.id,
            link_id: rule.link_id,
            target_type: rule.target_type,
            target_name: rule.target_name,
            target_method: rule.method,
            target_value: rule.target_value,
            redirect_url: rule.redirect_url,
        }
    }
}

/// Rules of one link in evaluation order.
#[derive(Debug, Serialize)]
pub struct RuleListResponse {
    pub link_id: i64,
    pub items: Vec<RuleResponse>,
}
