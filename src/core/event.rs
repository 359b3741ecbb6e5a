use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const EXCERPT_LIMIT: usize = 120;

/// Placeholder the server writes when an event has no source.
const MISSING_SOURCE: &str = "None";

/// One incremental unit from the event stream. Events are applied, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireEvent")]
pub struct Event {
    /// The message this event concerns; for `function_output` the output id.
    pub id: String,
    /// Server timestamp in Unix seconds, possibly fractional.
    pub created_at: f64,
    /// Partial fragment to merge rather than a full replacement.
    pub delta: bool,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    User {
        content: String,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        content: String,
    },
    FunctionCall {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        name: String,
        arguments: String,
    },
    FunctionOutput {
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        content: String,
    },
    Status {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        generating: bool,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        content: String,
    },
}

/// Decoding shape accepted from the wire.
///
/// The server marks fragments with `complete: false` instead of `delta: true`;
/// an explicit `delta` takes precedence, and both absent means a full event.
#[derive(Deserialize)]
struct WireEvent {
    id: String,
    created_at: f64,
    #[serde(default)]
    delta: Option<bool>,
    #[serde(default)]
    complete: Option<bool>,
    #[serde(flatten)]
    kind: EventKind,
}

impl From<WireEvent> for Event {
    fn from(wire: WireEvent) -> Self {
        let delta = wire
            .delta
            .unwrap_or_else(|| wire.complete.is_some_and(|complete| !complete));
        let mut kind = wire.kind;
        match &mut kind {
            EventKind::Assistant { source, .. }
            | EventKind::FunctionCall { source, .. }
            | EventKind::Status { source, .. }
            | EventKind::Error { source, .. } => {
                if source.as_deref() == Some(MISSING_SOURCE) {
                    *source = None;
                }
            }
            EventKind::User { .. } | EventKind::FunctionOutput { .. } => {}
        }
        Self {
            id: wire.id,
            created_at: wire.created_at,
            delta,
            kind,
        }
    }
}

#[derive(Debug, Error)]
pub enum EventDecodeError {
    #[error("malformed event payload `{excerpt}`: {source}")]
    Malformed {
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EventDecodeError {
    fn malformed(payload: &str, source: serde_json::Error) -> Self {
        Self::Malformed {
            excerpt: excerpt(payload),
            source,
        }
    }
}

impl Event {
    #[must_use]
    pub fn new(id: impl Into<String>, created_at: f64, kind: EventKind) -> Self {
        Self {
            id: id.into(),
            created_at,
            delta: false,
            kind,
        }
    }

    #[must_use]
    pub fn with_delta(mut self, delta: bool) -> Self {
        self.delta = delta;
        self
    }

    /// Decode one wire payload. Anything that is not a known variant shape is rejected.
    pub fn from_json(payload: &str) -> Result<Self, EventDecodeError> {
        serde_json::from_str(payload).map_err(|source| EventDecodeError::malformed(payload, source))
    }

    pub fn from_value(value: Value) -> Result<Self, EventDecodeError> {
        let payload = value.to_string();
        serde_json::from_value(value)
            .map_err(|source| EventDecodeError::malformed(&payload, source))
    }

    /// The wire `type` tag.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            EventKind::User { .. } => "user",
            EventKind::Assistant { .. } => "assistant",
            EventKind::FunctionCall { .. } => "function_call",
            EventKind::FunctionOutput { .. } => "function_output",
            EventKind::Status { .. } => "status",
            EventKind::Error { .. } => "error",
        }
    }

    pub fn source(&self) -> Option<&str> {
        match &self.kind {
            EventKind::User { .. } => None,
            EventKind::FunctionOutput { source, .. } => Some(source),
            EventKind::Assistant { source, .. }
            | EventKind::FunctionCall { source, .. }
            | EventKind::Status { source, .. }
            | EventKind::Error { source, .. } => source.as_deref(),
        }
    }
}

fn excerpt(payload: &str) -> String {
    let trimmed = payload.trim();
    match trimmed.char_indices().nth(EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delta_defaults_to_false_when_absent() {
        let event = Event::from_json(
            r#"{"id":"u1","created_at":1.5,"type":"user","content":"hi"}"#,
        )
        .expect("user event should decode");

        assert!(!event.delta);
        assert_eq!(event.created_at, 1.5);
        assert_eq!(
            event.kind,
            EventKind::User {
                content: "hi".to_string()
            }
        );
    }

    #[test]
    fn incomplete_server_events_decode_as_deltas() {
        let event = Event::from_value(json!({
            "id": "a1",
            "created_at": 10,
            "complete": false,
            "type": "assistant",
            "content": "Hel",
        }))
        .expect("assistant fragment should decode");
        assert!(event.delta);

        let complete = Event::from_value(json!({
            "id": "a1",
            "created_at": 10,
            "complete": true,
            "type": "assistant",
            "content": "Hello",
        }))
        .expect("complete assistant should decode");
        assert!(!complete.delta);
    }

    #[test]
    fn explicit_delta_wins_over_complete() {
        let event = Event::from_value(json!({
            "id": "a1",
            "created_at": 10,
            "delta": false,
            "complete": false,
            "type": "assistant",
            "content": "x",
        }))
        .expect("assistant should decode");
        assert!(!event.delta);
    }

    #[test]
    fn unknown_type_fails_fast() {
        let error = Event::from_json(r#"{"id":"x","created_at":1,"type":"telepathy"}"#)
            .expect_err("unknown variant must be rejected");
        assert!(error.to_string().contains("telepathy"));
    }

    #[test]
    fn missing_variant_field_fails_fast() {
        let result = Event::from_value(json!({
            "id": "o1",
            "created_at": 1,
            "type": "function_output",
            "content": "r1",
        }));
        assert!(result.is_err(), "function_output without source must be rejected");
    }

    #[test]
    fn extra_fields_are_tolerated() {
        let event = Event::from_value(json!({
            "id": "s1",
            "created_at": 1,
            "complete": true,
            "type": "status",
            "source": "a1",
            "generating": true,
            "trace": "ignored",
        }))
        .expect("status should decode");

        assert_eq!(event.kind_name(), "status");
        assert_eq!(event.source(), Some("a1"));
    }

    #[test]
    fn none_placeholder_source_decodes_as_absent() {
        let event = Event::from_value(json!({
            "id": "e1",
            "created_at": 1,
            "type": "error",
            "source": "None",
            "content": "boom",
        }))
        .expect("error should decode");

        assert_eq!(event.source(), None);
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let event = Event::new(
            "f1",
            2.0,
            EventKind::FunctionCall {
                source: None,
                name: "python".to_string(),
                arguments: "{}".to_string(),
            },
        )
        .with_delta(true);

        let value = serde_json::to_value(&event).expect("event should serialize");
        assert_eq!(
            value,
            json!({
                "id": "f1",
                "created_at": 2.0,
                "delta": true,
                "type": "function_call",
                "name": "python",
                "arguments": "{}",
            })
        );
    }

    #[test]
    fn excerpt_truncates_long_payloads() {
        let long = "x".repeat(500);
        let error = Event::from_json(&long).expect_err("garbage must fail");
        let EventDecodeError::Malformed { excerpt, .. } = error;
        assert!(excerpt.chars().count() <= EXCERPT_LIMIT + 1);
    }
}
