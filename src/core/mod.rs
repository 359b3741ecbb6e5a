//! Conversation data model, wire events and the reconciliation rules.

pub mod event;
pub mod message;
pub mod reconcile;
