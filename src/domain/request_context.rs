//! Request data consumed by redirect resolution.

use axum::http::{HeaderMap, header};

use crate::utils::cookies::parse_cookies;

/// Everything the resolution path reads from an inbound request.
///
/// Built once at the HTTP boundary so the orchestrator stays transport-free
/// apart from the header map itself.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub headers: HeaderMap,
    pub cookies: Vec<(String, String)>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl RequestContext {
    /// Captures headers, cookies, and click metadata from a request.
    pub fn new(headers: HeaderMap, ip: Option<String>) -> Self {
        let cookies = parse_cookies(&headers);
        let user_agent = header_string(&headers, header::USER_AGENT);
        let referer = header_string(&headers, header::REFERER);

        Self {
            headers,
            cookies,
            ip,
            user_agent,
            referer,
        }
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
        .map(str::to_string)
}
