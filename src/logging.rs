//! `tracing` subscriber setup shared by binaries.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

/// Targets raised to `trace` when `HEXE_DEBUG_EVENTS=1`.
const EVENT_TARGETS: [&str; 3] = ["hexe_chat::runtime", "hexe_api::client", "hexe_cli::runtime"];

/// Build the filter for `config`, falling back to the default directive when the
/// configured one does not parse.
pub fn env_filter(config: &EnvConfig) -> EnvFilter {
    let mut filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));
    if config.debug_events {
        for target in EVENT_TARGETS {
            if let Ok(directive) = format!("{target}=trace").parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    filter
}

/// Install the global subscriber. Returns `Ok(false)` when one is already set.
pub fn init_logging(config: &EnvConfig) -> io::Result<bool> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(true);

    let installed = match &config.write_log {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok()
        }
        None => builder.with_writer(io::stderr).try_init().is_ok(),
    };

    Ok(installed)
}
