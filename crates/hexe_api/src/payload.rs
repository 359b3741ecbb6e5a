use hexe_chat::Event;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::error::HexeApiError;

/// Window for a one-shot history fetch. `since`/`until` are Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<i64>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
            since: None,
            until: None,
        }
    }
}

impl HistoryQuery {
    pub fn latest(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn since(mut self, since: i64) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: i64) -> Self {
        self.until = Some(until);
        self
    }
}

/// `{"events": [...]}` body shared by history reads and submission replies.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsEnvelope {
    pub events: Vec<Value>,
}

impl EventsEnvelope {
    /// Decode every event, failing on the first malformed one.
    pub fn into_events(self) -> Result<Vec<Event>, HexeApiError> {
        self.events
            .into_iter()
            .map(|value| Event::from_value(value).map_err(HexeApiError::from))
            .collect()
    }
}
