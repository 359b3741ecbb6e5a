use std::sync::Arc;

use crate::core::event::Event;
use crate::core::message::Message;
use crate::core::reconcile::{ApplyOutcome, ChatState};

/// Immutable view of the conversation after a prefix of the event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub generating: bool,
    /// Number of events applied to produce this view.
    pub revision: u64,
}

/// Read-only consumer notified after every applied event.
pub trait ChatObserver: Send {
    fn on_change(&mut self, snapshot: &Arc<ChatSnapshot>);
}

impl<F> ChatObserver for F
where
    F: FnMut(&Arc<ChatSnapshot>) + Send,
{
    fn on_change(&mut self, snapshot: &Arc<ChatSnapshot>) {
        self(snapshot);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// Mutable owner of the conversation.
///
/// Mutation happens only through [`ChatStore::apply`], which takes `&mut self` and
/// so cannot be re-entered. Observers only ever see a shared [`ChatSnapshot`]
/// built after the event has been fully applied.
#[derive(Default)]
pub struct ChatStore {
    state: ChatState,
    revision: u64,
    cached: Option<Arc<ChatSnapshot>>,
    observers: Vec<(ObserverId, Box<dyn ChatObserver>)>,
    next_observer_id: u64,
}

impl ChatStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Apply one event, then notify every observer with the resulting snapshot.
    pub fn apply(&mut self, event: &Event) -> ApplyOutcome {
        let outcome = self.state.apply(event);
        self.revision += 1;
        self.cached = None;

        if !self.observers.is_empty() {
            let snapshot = self.snapshot();
            for (_, observer) in &mut self.observers {
                observer.on_change(&snapshot);
            }
        }

        outcome
    }

    /// Current view, rebuilt only when an event has been applied since the last call.
    pub fn snapshot(&mut self) -> Arc<ChatSnapshot> {
        if let Some(snapshot) = &self.cached {
            if snapshot.revision == self.revision {
                return Arc::clone(snapshot);
            }
        }

        let snapshot = Arc::new(ChatSnapshot {
            messages: self.state.messages().to_vec(),
            generating: self.state.generating(),
            revision: self.revision,
        });
        self.cached = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Register an observer. It is called on the next `apply`, not immediately.
    pub fn subscribe(&mut self, observer: impl ChatObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }
}

impl std::fmt::Debug for ChatStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStore")
            .field("state", &self.state)
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::event::EventKind;

    fn status(generating: bool) -> Event {
        Event::new(
            "s",
            1.0,
            EventKind::Status {
                source: None,
                generating,
            },
        )
    }

    #[test]
    fn snapshot_is_cached_between_applies() {
        let mut store = ChatStore::new();
        let first = store.snapshot();
        let second = store.snapshot();
        assert!(Arc::ptr_eq(&first, &second));

        store.apply(&status(true));
        let third = store.snapshot();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.revision, 1);
        assert!(third.generating);
    }

    #[test]
    fn observers_are_notified_in_subscription_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store = ChatStore::new();

        for label in ["a", "b"] {
            let seen = Arc::clone(&seen);
            store.subscribe(move |snapshot: &Arc<ChatSnapshot>| {
                seen.lock()
                    .expect("seen lock")
                    .push((label, snapshot.revision));
            });
        }

        store.apply(&status(true));
        assert_eq!(
            *seen.lock().expect("seen lock"),
            vec![("a", 1), ("b", 1)]
        );
    }

    #[test]
    fn unsubscribed_observer_is_not_notified() {
        let count = Arc::new(Mutex::new(0usize));
        let mut store = ChatStore::new();
        let id = {
            let count = Arc::clone(&count);
            store.subscribe(move |_: &Arc<ChatSnapshot>| {
                *count.lock().expect("count lock") += 1;
            })
        };

        store.apply(&status(true));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.apply(&status(false));

        assert_eq!(*count.lock().expect("count lock"), 1);
        assert_eq!(store.observer_count(), 0);
    }
}
