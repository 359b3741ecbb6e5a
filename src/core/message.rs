use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One conversation entry as exposed to observers.
///
/// The slot a message occupies in the list never moves once created; its fields
/// are mutated in place or replaced wholesale by later events carrying the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    /// Milliseconds since the Unix epoch, derived from the event that created or
    /// last fully replaced this message.
    #[serde(rename = "createdAt")]
    pub created_at_ms: i64,
    /// Application-reported errors, in arrival order. Only ever appended to,
    /// except that a wholesale replacement starts from an empty list.
    pub errors: Vec<String>,
    #[serde(flatten)]
    pub body: MessageBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBody {
    User {
        content: String,
    },
    Assistant {
        content: String,
    },
    FunctionCall {
        name: String,
        arguments: String,
        outputs: Vec<FunctionOutput>,
    },
}

/// Output produced by a function call, owned by exactly one function-call message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionOutput {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    FunctionCall,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::FunctionCall => "function_call",
        }
    }
}

impl Message {
    #[must_use]
    pub fn new(id: impl Into<String>, created_at_ms: i64, body: MessageBody) -> Self {
        Self {
            id: id.into(),
            created_at_ms,
            errors: Vec::new(),
            body,
        }
    }

    pub fn role(&self) -> MessageRole {
        self.body.role()
    }

    /// Text content for user/assistant messages.
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            MessageBody::User { content } | MessageBody::Assistant { content } => Some(content),
            MessageBody::FunctionCall { .. } => None,
        }
    }

    pub fn outputs(&self) -> &[FunctionOutput] {
        match &self.body {
            MessageBody::FunctionCall { outputs, .. } => outputs,
            _ => &[],
        }
    }

    pub fn is_function_call(&self) -> bool {
        matches!(self.body, MessageBody::FunctionCall { .. })
    }

    /// Calendar timestamp for presentation. `None` when the stored value falls
    /// outside the representable range.
    pub fn created_at(&self) -> Option<OffsetDateTime> {
        let nanos = i128::from(self.created_at_ms).checked_mul(1_000_000)?;
        OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
    }
}

impl MessageBody {
    pub fn role(&self) -> MessageRole {
        match self {
            Self::User { .. } => MessageRole::User,
            Self::Assistant { .. } => MessageRole::Assistant,
            Self::FunctionCall { .. } => MessageRole::FunctionCall,
        }
    }
}

/// Convert a wire timestamp in (possibly fractional) seconds to whole milliseconds.
pub fn seconds_to_millis(seconds: f64) -> i64 {
    // `as` saturates on overflow and maps NaN to zero.
    (seconds * 1000.0).round() as i64
}
