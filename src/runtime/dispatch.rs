use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use crate::core::event::Event;
use crate::core::reconcile::ApplyOutcome;
use crate::runtime::store::{ChatObserver, ChatSnapshot, ChatStore, ObserverId};

/// Single dispatch queue in front of a [`ChatStore`].
///
/// Any thread may enqueue. Draining pops and applies under the store lock, so
/// events reach the store strictly in enqueue order even when several threads
/// drain at once.
///
/// Observers run while the store lock is held and must not call back into the
/// dispatcher; they get everything they need from the snapshot.
#[derive(Debug)]
pub struct EventDispatcher {
    store: Mutex<ChatStore>,
    pending: Mutex<VecDeque<Event>>,
}

impl EventDispatcher {
    pub fn new(store: ChatStore) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            pending: Mutex::new(VecDeque::new()),
        })
    }

    /// Queue an event. Returns true when the queue was empty, meaning the caller
    /// is responsible for scheduling a drain.
    pub fn enqueue(&self, event: Event) -> bool {
        let mut pending = lock_unpoisoned(&self.pending);
        let should_drain = pending.is_empty();
        pending.push_back(event);
        should_drain
    }

    /// Apply every queued event in FIFO order. Returns how many were applied.
    pub fn drain(&self) -> usize {
        let mut store = lock_unpoisoned(&self.store);
        let mut drained = 0usize;

        loop {
            let event = lock_unpoisoned(&self.pending).pop_front();
            let Some(event) = event else {
                break;
            };

            let outcome = store.apply(&event);
            log_outcome(&event, outcome, store.revision());
            drained += 1;
        }

        drained
    }

    /// Enqueue and drain immediately.
    pub fn dispatch(&self, event: Event) -> usize {
        self.enqueue(event);
        self.drain()
    }

    pub fn pending_len(&self) -> usize {
        lock_unpoisoned(&self.pending).len()
    }

    pub fn snapshot(&self) -> Arc<ChatSnapshot> {
        lock_unpoisoned(&self.store).snapshot()
    }

    pub fn subscribe(&self, observer: impl ChatObserver + 'static) -> ObserverId {
        lock_unpoisoned(&self.store).subscribe(observer)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        lock_unpoisoned(&self.store).unsubscribe(id)
    }
}

fn log_outcome(event: &Event, outcome: ApplyOutcome, revision: u64) {
    match outcome {
        ApplyOutcome::Ignored(reason) => debug!(
            event_id = %event.id,
            kind = event.kind_name(),
            source = event.source().unwrap_or_default(),
            ?reason,
            revision,
            "event ignored"
        ),
        ApplyOutcome::StatusChanged { generating } => debug!(
            event_id = %event.id,
            generating,
            revision,
            "generating flag updated"
        ),
        outcome => trace!(
            event_id = %event.id,
            kind = event.kind_name(),
            delta = event.delta,
            ?outcome,
            revision,
            "event applied"
        ),
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
