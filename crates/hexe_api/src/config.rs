use std::collections::BTreeMap;
use std::time::Duration;

use crate::url::DEFAULT_BASE_URL;

/// Number of history events the server replays when a stream connects.
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Transport configuration for the chat server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexeApiConfig {
    /// Server origin, e.g. `https://hexe.example`.
    pub base_url: String,
    /// Value of the `session` cookie issued by the login flow.
    pub session_token: Option<String>,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional timeout for non-streaming requests.
    pub timeout: Option<Duration>,
    /// History replayed on connect (`limit` query parameter).
    pub history_limit: u32,
}

impl Default for HexeApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_token: None,
            user_agent: None,
            extra_headers: BTreeMap::new(),
            timeout: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl HexeApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_history_limit(mut self, history_limit: u32) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extra_headers.extend(headers);
        self
    }
}
