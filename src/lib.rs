//! Client-side reconciliation of a streamed chat conversation.
//!
//! A server pushes an ordered feed of [`Event`]s over a long-lived connection.
//! This crate folds them, one at a time and strictly in arrival order, into a
//! list of [`Message`]s plus a `generating` flag, and publishes an immutable
//! [`ChatSnapshot`] to observers after every event.
//!
//! # Layers
//! - [`ChatState::apply`] is the pure transition: one event in, one
//!   [`ApplyOutcome`] out. It never fails and never logs.
//! - [`ChatStore`] owns the state, counts revisions and notifies observers.
//! - [`EventDispatcher`] is the single queue that serializes producers.
//!
//! Transport (SSE decoding, HTTP) lives in `hexe_api`; terminal wiring lives in
//! `hexe_cli`.

pub mod config;
pub mod logging;

pub mod core;
pub mod runtime;

pub use crate::core::event::{Event, EventDecodeError, EventKind};
pub use crate::core::message::{FunctionOutput, Message, MessageBody, MessageRole};
pub use crate::core::reconcile::{ApplyOutcome, ChatState, IgnoreReason};
pub use crate::runtime::{ChatObserver, ChatSnapshot, ChatStore, EventDispatcher, ObserverId};
