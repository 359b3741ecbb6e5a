use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hexe_api::config::DEFAULT_HISTORY_LIMIT;
use hexe_api::url::DEFAULT_BASE_URL;
use hexe_api::HexeApiConfig;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV_VAR: &str = "HEXE_CONFIG_PATH";
pub const BASE_URL_ENV_VAR: &str = "HEXE_BASE_URL";
pub const SESSION_TOKEN_ENV_VAR: &str = "HEXE_SESSION_TOKEN";

#[derive(Debug, Error)]
pub enum CliConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: String,
    #[serde(default)]
    session_token: Option<String>,
    #[serde(default)]
    history_limit: Option<u32>,
    #[serde(default)]
    timeout_sec: Option<u64>,
}

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub base_url: String,
    pub session_token: Option<String>,
    pub history_limit: u32,
    pub timeout: Option<Duration>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_token: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            timeout: None,
        }
    }
}

impl CliConfig {
    /// Load from `HEXE_CONFIG_PATH` when set, otherwise from
    /// `HEXE_BASE_URL` / `HEXE_SESSION_TOKEN`.
    pub fn from_env() -> Result<Self, CliConfigError> {
        if let Some(path) = env_string_opt(CONFIG_PATH_ENV_VAR) {
            return Self::load(path);
        }

        Ok(Self {
            base_url: env_string_opt(BASE_URL_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            session_token: env_string_opt(SESSION_TOKEN_ENV_VAR),
            ..Self::default()
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CliConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CliConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse and validate config text. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self, CliConfigError> {
        let file: ConfigFile =
            serde_json::from_str(text).map_err(|source| CliConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let invalid = |reason: &str| CliConfigError::Invalid {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let base_url = file.base_url.trim();
        if base_url.is_empty() {
            return Err(invalid("`base_url` must not be empty"));
        }

        let history_limit = match file.history_limit {
            Some(0) => return Err(invalid("`history_limit` must be > 0")),
            Some(limit) => limit,
            None => DEFAULT_HISTORY_LIMIT,
        };

        let timeout = match file.timeout_sec {
            Some(0) => return Err(invalid("`timeout_sec` must be > 0")),
            Some(seconds) => Some(Duration::from_secs(seconds)),
            None => None,
        };

        let session_token = file
            .session_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        Ok(Self {
            base_url: base_url.to_string(),
            session_token,
            history_limit,
            timeout,
        })
    }

    pub fn api_config(&self) -> HexeApiConfig {
        let mut config =
            HexeApiConfig::new(self.base_url.clone()).with_history_limit(self.history_limit);
        if let Some(token) = &self.session_token {
            config = config.with_session_token(token.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        config
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<CliConfig, CliConfigError> {
        CliConfig::parse(text, Path::new("hexe.json"))
    }

    #[test]
    fn minimal_file_uses_defaults() {
        let config = parse(r#"{"base_url": "https://chat.example"}"#).expect("valid config");
        assert_eq!(config.base_url, "https://chat.example");
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.timeout, None);
        assert_eq!(config.session_token, None);
    }

    #[test]
    fn blank_session_token_is_dropped() {
        let config = parse(r#"{"base_url": "https://chat.example", "session_token": "  "}"#)
            .expect("valid config");
        assert_eq!(config.session_token, None);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let error = parse(r#"{"base_url": "x", "history_limit": 0}"#).expect_err("zero limit");
        assert!(error.to_string().contains("history_limit"));

        let error = parse(r#"{"base_url": "x", "timeout_sec": 0}"#).expect_err("zero timeout");
        assert!(error.to_string().contains("timeout_sec"));
    }

    #[test]
    fn api_config_carries_every_field() {
        let config = parse(
            r#"{"base_url": "https://chat.example", "session_token": "tok", "history_limit": 5, "timeout_sec": 9}"#,
        )
        .expect("valid config");

        let api = config.api_config();
        assert_eq!(api.base_url, "https://chat.example");
        assert_eq!(api.session_token.as_deref(), Some("tok"));
        assert_eq!(api.history_limit, 5);
        assert_eq!(api.timeout, Some(Duration::from_secs(9)));
    }
}
