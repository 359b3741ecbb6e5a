//! Deterministic implementation of the `hexe_api::EventSource` contract.
//!
//! Plays back scripted connections without any network. Used by the
//! `hexe_cli` runtime tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use hexe_api::{CancellationSignal, EventSource, HexeApiError, StreamEnd};
use hexe_chat::Event;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// One scripted connection: the events it delivers, then how it ends.
#[derive(Debug, Clone)]
pub struct ScriptedConnection {
    pub events: Vec<Event>,
    pub failure: Option<String>,
}

impl ScriptedConnection {
    #[must_use]
    pub fn closes_after(events: Vec<Event>) -> Self {
        Self {
            events,
            failure: None,
        }
    }

    #[must_use]
    pub fn fails_after(events: Vec<Event>, error: impl Into<String>) -> Self {
        Self {
            events,
            failure: Some(error.into()),
        }
    }
}

/// Each `stream` call plays the next scripted connection. Once the script is
/// exhausted the source idles until cancelled.
#[derive(Debug, Default)]
pub struct ScriptedEventSource {
    connections: Mutex<VecDeque<ScriptedConnection>>,
    submitted: Mutex<Vec<String>>,
    connects: AtomicU64,
}

impl ScriptedEventSource {
    #[must_use]
    pub fn new(connections: Vec<ScriptedConnection>) -> Self {
        Self {
            connections: Mutex::new(connections.into()),
            submitted: Mutex::new(Vec::new()),
            connects: AtomicU64::new(0),
        }
    }

    /// Messages accepted by `submit`, in order.
    pub fn submitted(&self) -> Vec<String> {
        lock_unpoisoned(&self.submitted).clone()
    }

    pub fn connect_count(&self) -> u64 {
        self.connects.load(Ordering::Acquire)
    }

    pub fn is_exhausted(&self) -> bool {
        lock_unpoisoned(&self.connections).is_empty()
    }
}

impl EventSource for ScriptedEventSource {
    fn stream(
        &self,
        cancel: &CancellationSignal,
        on_event: &mut dyn FnMut(Event),
    ) -> Result<StreamEnd, HexeApiError> {
        self.connects.fetch_add(1, Ordering::AcqRel);
        let next = lock_unpoisoned(&self.connections).pop_front();
        let Some(connection) = next else {
            while !cancel.load(Ordering::Acquire) {
                thread::sleep(CANCEL_POLL_INTERVAL);
            }
            return Err(HexeApiError::Cancelled);
        };

        let mut end = StreamEnd::default();
        for event in connection.events {
            if cancel.load(Ordering::Acquire) {
                return Err(HexeApiError::Cancelled);
            }
            on_event(event);
            end.events += 1;
        }

        match connection.failure {
            Some(error) => Err(HexeApiError::RetryExhausted {
                status: None,
                last_error: Some(error),
            }),
            None => Ok(end),
        }
    }

    fn submit(&self, content: &str) -> Result<(), HexeApiError> {
        if content.trim().is_empty() {
            return Err(HexeApiError::EmptyMessage);
        }
        lock_unpoisoned(&self.submitted).push(content.to_string());
        Ok(())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
