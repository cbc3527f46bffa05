//! Client IP extraction for click metadata.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Resolves the IP address to record for a request.
///
/// When the service runs behind a reverse proxy the first entry of
/// `X-Forwarded-For` wins, then `X-Real-IP`. Otherwise, or when neither
/// header carries a usable value, the TCP peer address is used.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// let ip = client_ip(&headers, Some(peer), true);
/// assert_eq!(ip.as_deref(), Some("203.0.113.7"));
/// ```
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> Option<String> {
    if behind_proxy
        && let Some(ip) = forwarded_for(headers).or_else(|| real_ip(headers))
    {
        return Some(ip);
    }

    peer.map(|addr| addr.ip().to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn real_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
