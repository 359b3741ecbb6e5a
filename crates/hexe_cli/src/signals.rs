use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

/// Keeps the SIGINT/SIGTERM listener alive; dropping it unregisters the hook.
pub struct SignalHookGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

impl Drop for SignalHookGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Run `on_signal` once on the first SIGINT or SIGTERM.
pub fn install_signal_handlers<F>(on_signal: F) -> io::Result<SignalHookGuard>
where
    F: Fn() + Send + Sync + 'static,
{
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let handle = signals.handle();
    let ran = Arc::new(AtomicBool::new(false));

    let thread = thread::Builder::new()
        .name("hexe-signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                tracing::debug!(signal, "termination signal received");
                if !ran.swap(true, Ordering::SeqCst) {
                    on_signal();
                }
            }
        })?;

    Ok(SignalHookGuard {
        handle,
        thread: Some(thread),
    })
}
