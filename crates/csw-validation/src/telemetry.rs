//! Tracing subscriber installation.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Errors raised while installing the subscriber.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The configured filter directive is malformed.
    #[error("invalid log filter {filter:?}: {reason}")]
    Filter { filter: String, reason: String },

    /// A global subscriber is already installed.
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInitialised(String),
}

/// Build the filter: `RUST_LOG` if set, else `config.filter`.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|e| TelemetryError::Filter {
        filter: config.filter.clone(),
        reason: e.to_string(),
    })
}

/// Install the global fmt subscriber, JSON or human-readable.
pub fn init_tracing(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;
    let installed = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
    };
    installed.map_err(|e| TelemetryError::AlreadyInitialised(e.to_string()))
}
