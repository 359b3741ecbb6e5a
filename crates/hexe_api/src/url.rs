use crate::payload::HistoryQuery;

/// Default server origin for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Path serving both the event stream/history (`GET`) and message submission (`POST`).
pub const EVENTS_PATH: &str = "/api/events";

/// Normalize a configured origin.
///
/// Normalization rules:
/// 1) blank input falls back to [`DEFAULT_BASE_URL`]
/// 2) trailing slashes are dropped
/// 3) a trailing `/api` or `/api/events` suffix is stripped so callers may paste
///    either the origin or an endpoint
pub fn normalize_base_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(EVENTS_PATH).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);
    trimmed.to_string()
}

/// Live stream endpoint; the server first replays the last `limit` events.
pub fn events_stream_url(base_url: &str, limit: u32) -> String {
    format!(
        "{}{EVENTS_PATH}?stream=true&limit={limit}",
        normalize_base_url(base_url)
    )
}

/// One-shot history endpoint.
pub fn events_history_url(base_url: &str, query: &HistoryQuery) -> String {
    let mut url = format!(
        "{}{EVENTS_PATH}?limit={}",
        normalize_base_url(base_url),
        query.limit
    );
    if let Some(since) = query.since {
        url.push_str(&format!("&since={since}"));
    }
    if let Some(until) = query.until {
        url.push_str(&format!("&until={until}"));
    }
    url
}

/// Plain-text message submission endpoint.
pub fn submit_url(base_url: &str) -> String {
    format!("{}{EVENTS_PATH}", normalize_base_url(base_url))
}
