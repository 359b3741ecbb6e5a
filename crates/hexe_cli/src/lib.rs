//! Line-oriented terminal client for the hexe chat server.
//!
//! Wires the `hexe_api` transport into the `hexe_chat` reconciliation engine:
//! a worker thread follows the server's event stream and dispatches every event,
//! and a [`transcript::TranscriptPrinter`] prints the conversation whenever the
//! server goes idle. Lines typed on stdin are submitted as messages.
//!
//! ## Configuration
//!
//! Set `HEXE_CONFIG_PATH` to a UTF-8 JSON file with this shape:
//!
//! ```json
//! {
//!   "base_url": "https://chat.example",
//!   "session_token": "<value of the session cookie>",
//!   "history_limit": 20,
//!   "timeout_sec": 30
//! }
//! ```
//!
//! - `base_url` is required and must not be empty.
//! - `history_limit` and `timeout_sec` are optional and must be > 0 when provided.
//! - Unknown JSON fields are rejected.
//!
//! Without a config file, `HEXE_BASE_URL` and `HEXE_SESSION_TOKEN` are read
//! instead. Logging follows `HEXE_LOG` / `HEXE_WRITE_LOG` (see `hexe_chat::config`).

pub mod commands;
pub mod config;
pub mod runtime;
#[cfg(unix)]
pub mod signals;
pub mod transcript;
