//! `Cookie` request header parsing.

use axum::http::{HeaderMap, header::COOKIE};
use cookie::Cookie;

/// Collects every cookie pair sent with a request, in header order.
///
/// All `Cookie` headers are read (HTTP/2 clients may split them). Header
/// bytes are decoded lossily, so a pair carrying bytes that are not UTF-8
/// only damages its own value. Pairs that fail to parse (no `=`, empty name)
/// are dropped without affecting their neighbours. A value wrapped in double
/// quotes is unwrapped. Duplicate names are preserved so rules can inspect
/// every occurrence.
pub fn parse_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(COOKIE)
        .iter()
        .flat_map(|value| Cookie::split_parse(String::from_utf8_lossy(value.as_bytes())))
        .filter_map(Result::ok)
        .map(|cookie| (cookie.name().to_string(), cookie.value_trimmed().to_string()))
        .collect()
}
