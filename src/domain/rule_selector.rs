//! Selection of the redirect rule that fires for a request.
//!
//! Two passes over the rules in retrieval order:
//!
//! 1. header rules against every value of the named header
//! 2. cookie rules against every cookie with the named name
//!
//! The first rule whose predicate succeeds wins. A header rule therefore beats
//! any cookie rule no matter where either sits in storage order.

use axum::http::{HeaderMap, HeaderName};

use crate::domain::entities::{RedirectRule, TargetType};
use crate::domain::matcher::matches;

/// Returns the rule that should fire, or `None` to fall back to the link's
/// original URL.
pub fn select<'a>(
    rules: &'a [RedirectRule],
    headers: &HeaderMap,
    cookies: &[(String, String)],
) -> Option<&'a RedirectRule> {
    select_by_header(rules, headers).or_else(|| select_by_cookie(rules, cookies))
}

fn select_by_header<'a>(rules: &'a [RedirectRule], headers: &HeaderMap) -> Option<&'a RedirectRule> {
    rules
        .iter()
        .filter(|rule| rule.target_type == TargetType::Header)
        .find(|rule| {
            let Some((name, value)) = rule.predicate() else {
                return false;
            };
            // Names go through the same normalization the transport applied
            // to the incoming headers; a name that is not a valid header name
            // can never be present.
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                return false;
            };

            headers
                .get_all(&name)
                .iter()
                .filter_map(|observed| std::str::from_utf8(observed.as_bytes()).ok())
                .any(|observed| matches(observed, rule.method, value))
        })
}

fn select_by_cookie<'a>(
    rules: &'a [RedirectRule],
    cookies: &[(String, String)],
) -> Option<&'a RedirectRule> {
    rules
        .iter()
        .filter(|rule| rule.target_type == TargetType::Cookie)
        .find(|rule| {
            let Some((name, value)) = rule.predicate() else {
                return false;
            };

            cookies
                .iter()
                .filter(|(cookie_name, _)| cookie_name == name)
                .any(|(_, observed)| matches(observed, rule.method, value))
        })
}
