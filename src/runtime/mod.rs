//! Observable store and the serialized dispatch queue in front of it.

pub mod dispatch;
pub mod store;

pub use dispatch::EventDispatcher;
pub use store::{ChatObserver, ChatSnapshot, ChatStore, ObserverId};
