#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use hexe_chat::{Event, EventKind};

pub const T0: f64 = 1_700_000_000.0;

/// `Write` sink that can be inspected while a printer owns it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock_unpoisoned(&self.0)).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        lock_unpoisoned(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn user(id: &str, content: &str) -> Event {
    Event::new(
        id,
        T0,
        EventKind::User {
            content: content.to_string(),
        },
    )
}

pub fn assistant(id: &str, content: &str) -> Event {
    Event::new(
        id,
        T0 + 1.0,
        EventKind::Assistant {
            source: None,
            content: content.to_string(),
        },
    )
}

pub fn status(id: &str, generating: bool) -> Event {
    Event::new(
        id,
        T0 + 2.0,
        EventKind::Status {
            source: None,
            generating,
        },
    )
}

pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
