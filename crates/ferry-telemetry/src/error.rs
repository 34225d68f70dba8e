//! Telemetry error types.

use thiserror::Error;

/// Errors raised while building or installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level or a directive is not a valid filter expression.
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    /// A named setting has a value outside its accepted set.
    #[error("unrecognized {setting} '{value}'")]
    UnknownSetting {
        /// Setting name, e.g. "log format".
        setting: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(String),

    /// The log directory could not be created.
    #[error("log directory unavailable: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
