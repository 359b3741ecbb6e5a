use std::collections::BTreeMap;

use crate::config::HexeApiConfig;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_COOKIE: &str = "cookie";
pub const HEADER_CACHE_CONTROL: &str = "cache-control";
pub const HEADER_USER_AGENT: &str = "user-agent";

pub const ACCEPT_EVENT_STREAM: &str = "text/event-stream";
pub const ACCEPT_JSON: &str = "application/json";

/// Cookie set by the server's login endpoint.
pub const SESSION_COOKIE: &str = "session";

/// Build a deterministic header map for chat server requests.
///
/// `accept` is the caller's expected response type ([`ACCEPT_EVENT_STREAM`] for
/// the live stream, [`ACCEPT_JSON`] otherwise).
pub fn build_headers(config: &HexeApiConfig, accept: &str) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    headers.insert(HEADER_ACCEPT.to_owned(), accept.to_owned());
    if accept == ACCEPT_EVENT_STREAM {
        headers.insert(HEADER_CACHE_CONTROL.to_owned(), "no-cache".to_owned());
    }

    let ua = config
        .user_agent
        .as_deref()
        .and_then(sanitize_nonempty)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    if let Some(token) = config.session_token.as_deref().and_then(sanitize_nonempty) {
        headers.insert(HEADER_COOKIE.to_owned(), format!("{SESSION_COOKIE}={token}"));
    }

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    headers
}

fn sanitize_nonempty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

pub fn default_user_agent() -> String {
    format!(
        "hexe_api/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}
