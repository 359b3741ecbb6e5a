//! HTTP transport for the hexe chat server.
//!
//! Owns the wire side of the conversation: the live `text/event-stream` feed,
//! history reads and plain-text message submission. Decoded events are handed
//! to callers in arrival order; reconciling them into messages is the job of
//! `hexe_chat`. Login is out of scope: callers supply the `session` cookie.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod retry;
pub mod source;
pub mod sse;
pub mod url;

pub use client::{CancellationSignal, HexeApiClient};
pub use config::HexeApiConfig;
pub use error::HexeApiError;
pub use events::{StreamEnd, StreamItem};
pub use payload::HistoryQuery;
pub use source::EventSource;
pub use sse::SseStreamParser;
pub use url::normalize_base_url;
