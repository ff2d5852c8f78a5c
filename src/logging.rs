//! # Logging
//!
//! Tracing subscriber setup for the binary.
//!
//! `RUST_LOG` takes precedence; otherwise `LOG_LEVEL` (ERROR, WARN, INFO,
//! DEBUG, TRACE) applies to this crate. `LOG_FORMAT=json` switches to
//! structured JSON lines for log shippers.

use crate::constants::{DEFAULT_LOG_FORMAT, DEFAULT_LOG_LEVEL, ENV_LOG_FORMAT, ENV_LOG_LEVEL};
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Output format of the log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Anything other than `json` falls back to text
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Default filter directive for a `LOG_LEVEL` value
#[must_use]
pub fn default_directive(log_level: &str) -> String {
    let level = match log_level.trim().to_lowercase().as_str() {
        "error" => "error",
        "warn" | "warning" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    };
    format!("vault_secret_sync={level}")
}

/// Install the global subscriber from `LOG_LEVEL` / `LOG_FORMAT`
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init_from_env() -> Result<()> {
    let log_level = std::env::var(ENV_LOG_LEVEL).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    let log_format =
        std::env::var(ENV_LOG_FORMAT).unwrap_or_else(|_| DEFAULT_LOG_FORMAT.to_string());
    init(&log_level, LogFormat::parse(&log_format))
}

/// Install the global subscriber
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level)));

    let result = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}
