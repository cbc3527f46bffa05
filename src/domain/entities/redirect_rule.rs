//! Redirect rule entity: a conditional override of a link's destination.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which part of the request a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetType {
    Header,
    Cookie,
}

/// How the observed value is compared with the rule's target value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMethod {
    /// Exact string equality.
    Match,
    /// Unanchored regular expression search.
    Regex,
    Contains,
    StartsWith,
    EndsWith,
}

/// Returned when a stored tag does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub value: String,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Header => "header",
            TargetType::Cookie => "cookie",
        }
    }
}

impl FromStr for TargetType {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header" => Ok(TargetType::Header),
            "cookie" => Ok(TargetType::Cookie),
            other => Err(UnknownTag {
                kind: "target type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Match => "match",
            MatchMethod::Regex => "regex",
            MatchMethod::Contains => "contains",
            MatchMethod::StartsWith => "startsWith",
            MatchMethod::EndsWith => "endsWith",
        }
    }
}

impl FromStr for MatchMethod {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "match" => Ok(MatchMethod::Match),
            "regex" => Ok(MatchMethod::Regex),
            "contains" => Ok(MatchMethod::Contains),
            "startsWith" => Ok(MatchMethod::StartsWith),
            "endsWith" => Ok(MatchMethod::EndsWith),
            other => Err(UnknownTag {
                kind: "match method",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored redirect rule.
///
/// A rule without `target_name` or `target_value` can never match; it is kept
/// as-is so its owner can complete it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRule {
    pub id: i64,
    pub link_id: i64,
    pub target_type: TargetType,
    pub target_name: Option<String>,
    pub method: MatchMethod,
    pub target_value: Option<String>,
    pub redirect_url: String,
}

impl RedirectRule {
    /// Returns the `(name, value)` pair this rule compares against, or `None`
    /// when the rule is inert.
    pub fn predicate(&self) -> Option<(&str, &str)> {
        match (&self.target_name, &self.target_value) {
            (Some(name), Some(value)) => Some((name.as_str(), value.as_str())),
            _ => None,
        }
    }
}

/// Predicate and destination of a rule, shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    pub target_type: TargetType,
    pub target_name: Option<String>,
    pub method: MatchMethod,
    pub target_value: Option<String>,
    pub redirect_url: String,
}

/// Input data for creating a rule on a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRedirectRule {
    pub link_id: i64,
    pub definition: RuleDefinition,
}
