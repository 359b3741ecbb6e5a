use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hexe_api::retry::{BASE_DELAY_MS, MAX_DELAY_MS};
use hexe_api::{CancellationSignal, EventSource, HexeApiClient, HexeApiError, StreamEnd};
use hexe_chat::{ChatSnapshot, Event, EventDispatcher};

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// [`EventSource`] backed by the chat server.
#[derive(Debug)]
pub struct HttpEventSource {
    client: HexeApiClient,
}

impl HttpEventSource {
    pub fn new(client: HexeApiClient) -> Self {
        Self { client }
    }

    fn runtime() -> Result<tokio::runtime::Runtime, HexeApiError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| HexeApiError::Runtime(error.to_string()))
    }
}

impl EventSource for HttpEventSource {
    fn stream(
        &self,
        cancel: &CancellationSignal,
        on_event: &mut dyn FnMut(Event),
    ) -> Result<StreamEnd, HexeApiError> {
        Self::runtime()?.block_on(
            self.client
                .stream_events_with_handler(Some(cancel), |event| on_event(event)),
        )
    }

    fn submit(&self, content: &str) -> Result<(), HexeApiError> {
        Self::runtime()?.block_on(self.client.submit_message(content))
    }
}

/// Backoff between stream connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(BASE_DELAY_MS),
            max: Duration::from_millis(MAX_DELAY_MS),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the next connection after `failures` consecutive failures.
    pub fn delay(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures.min(16));
        self.initial.saturating_mul(factor).min(self.max)
    }
}

/// Keeps one stream subscription alive and feeds it into the dispatcher.
pub struct StreamRuntime {
    source: Arc<dyn EventSource>,
    dispatcher: Arc<EventDispatcher>,
    cancel: CancellationSignal,
    policy: ReconnectPolicy,
    connections: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl StreamRuntime {
    pub fn new(source: Arc<dyn EventSource>, dispatcher: Arc<EventDispatcher>) -> Arc<Self> {
        Self::with_policy(source, dispatcher, ReconnectPolicy::default())
    }

    pub fn with_policy(
        source: Arc<dyn EventSource>,
        dispatcher: Arc<EventDispatcher>,
        policy: ReconnectPolicy,
    ) -> Arc<Self> {
        Arc::new(Self {
            source,
            dispatcher,
            cancel: Arc::new(AtomicBool::new(false)),
            policy,
            connections: AtomicU64::new(0),
            worker: Mutex::new(None),
        })
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    pub fn cancel_signal(&self) -> CancellationSignal {
        Arc::clone(&self.cancel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> Arc<ChatSnapshot> {
        self.dispatcher.snapshot()
    }

    /// Connections opened so far, including the current one.
    pub fn connection_count(&self) -> u64 {
        self.connections.load(Ordering::Acquire)
    }

    /// Spawn the stream worker. Calling `start` on a running runtime is a no-op.
    pub fn start(self: &Arc<Self>) -> std::io::Result<()> {
        let mut worker = lock_unpoisoned(&self.worker);
        if worker.is_some() {
            return Ok(());
        }

        let runtime = Arc::clone(self);
        let handle = thread::Builder::new()
            .name("hexe-event-stream".to_string())
            .spawn(move || runtime.run_worker())?;
        *worker = Some(handle);
        Ok(())
    }

    pub fn submit(&self, content: &str) -> Result<(), HexeApiError> {
        self.source.submit(content)
    }

    /// Cancel the stream and wait for the worker to exit.
    pub fn shutdown(&self) {
        self.cancel.store(true, Ordering::Release);
        let worker = lock_unpoisoned(&self.worker).take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                tracing::error!("event stream worker panicked");
            }
        }
    }

    fn run_worker(self: Arc<Self>) {
        let mut failures = 0u32;

        while !self.is_cancelled() {
            let connection = self.connections.fetch_add(1, Ordering::AcqRel) + 1;
            tracing::info!(connection, "opening event stream");

            let dispatcher = Arc::clone(&self.dispatcher);
            let result = self.source.stream(&self.cancel, &mut |event| {
                dispatcher.dispatch(event);
            });

            match result {
                Ok(end) => {
                    tracing::info!(
                        events = end.events,
                        heartbeats = end.heartbeats,
                        "event stream ended, reconnecting"
                    );
                    failures = 0;
                }
                Err(HexeApiError::Cancelled) => break,
                Err(error) if error.is_unauthorized() => {
                    tracing::error!(%error, "session rejected by server; log in again");
                    break;
                }
                Err(error) => {
                    tracing::warn!(%error, failures, "event stream failed");
                    failures = failures.saturating_add(1);
                }
            }

            if !self.sleep_unless_cancelled(self.policy.delay(failures)) {
                break;
            }
        }

        tracing::debug!("event stream worker stopped");
    }

    fn sleep_unless_cancelled(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(CANCEL_POLL_INTERVAL.min(deadline - now));
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconnect_delay_doubles_up_to_the_cap() {
        let policy = ReconnectPolicy {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(1_000),
        };

        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
        assert_eq!(policy.delay(4), Duration::from_millis(1_000));
        assert_eq!(policy.delay(u32::MAX), Duration::from_millis(1_000));
    }
}
