use hexe_chat::EventDecodeError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HexeApiError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0} {1}")]
    Status(StatusCode, String),

    #[error(transparent)]
    MalformedEvent(#[from] EventDecodeError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("message content must not be empty")]
    EmptyMessage,

    #[error("retry exhausted after max attempts (status: {}, last_error: {last_error:?})", display_status(.status))]
    RetryExhausted {
        status: Option<StatusCode>,
        last_error: Option<String>,
    },

    #[error("request was cancelled")]
    Cancelled,

    #[error("failed to initialize async runtime: {0}")]
    Runtime(String),
}

impl HexeApiError {
    /// Login is owned by the surrounding application; a 401 means the session
    /// cookie is missing or expired.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status(StatusCode::UNAUTHORIZED, _))
    }
}

fn display_status(status: &Option<StatusCode>) -> String {
    status
        .map(|status| status.as_u16().to_string())
        .unwrap_or_else(|| "n/a".to_owned())
}

/// FastAPI-style error body.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub detail: Option<ErrorDetail>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetail {
    Text(String),
    Structured(serde_json::Value),
}

/// Turn an HTTP error body into a readable message.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.to_string()
        }
    };

    let Ok(parsed) = serde_json::from_str::<ErrorPayload>(body) else {
        return fallback();
    };

    match (parsed.detail, parsed.message) {
        (Some(ErrorDetail::Text(detail)), _) if !detail.is_empty() => detail,
        (Some(ErrorDetail::Structured(detail)), _) => detail.to_string(),
        (_, Some(message)) if !message.is_empty() => message,
        _ => fallback(),
    }
}
