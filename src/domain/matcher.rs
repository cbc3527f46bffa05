//! Predicate matching for redirect rules.

use regex::Regex;
use tracing::debug;

use crate::domain::entities::MatchMethod;

/// Tests one observed header or cookie value against a rule operand.
///
/// | method       | succeeds when                                   |
/// |--------------|-------------------------------------------------|
/// | `match`      | `observed == target`                            |
/// | `contains`   | `target` is a substring of `observed`           |
/// | `startsWith` | `observed` begins with `target`                 |
/// | `endsWith`   | `observed` ends with `target`                   |
/// | `regex`      | `target` compiles and matches anywhere in `observed` |
///
/// An unparsable pattern is a non-match and is never reported to the caller.
pub fn matches(observed: &str, method: MatchMethod, target: &str) -> bool {
    match method {
        MatchMethod::Match => observed == target,
        MatchMethod::Contains => observed.contains(target),
        MatchMethod::StartsWith => observed.starts_with(target),
        MatchMethod::EndsWith => observed.ends_with(target),
        MatchMethod::Regex => regex_matches(observed, target),
    }
}

fn regex_matches(observed: &str, pattern: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(observed),
        Err(e) => {
            debug!(pattern, error = %e, "Ignoring rule with invalid regex pattern");
            false
        }
    }
}
