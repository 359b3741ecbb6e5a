//! Environment configuration.

use std::env;

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// `tracing` filter directive (`HEXE_LOG`).
    pub log_filter: String,
    /// Append logs to this file instead of stderr (`HEXE_WRITE_LOG`).
    pub write_log: Option<String>,
    /// Trace every applied event (`HEXE_DEBUG_EVENTS=1`).
    pub debug_events: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            write_log: None,
            debug_events: false,
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_filter: env_string_opt("HEXE_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            write_log: env_string_opt("HEXE_WRITE_LOG"),
            debug_events: env_flag("HEXE_DEBUG_EVENTS"),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
