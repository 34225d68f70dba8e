//! Configuration types.
//!
//! These mirror the domain settings of the other crates without depending on
//! them; the CLI converts at startup. Every section implements [`Default`]
//! with the same values as `defaults.toml`, so a bare `[section]` header
//! yields a working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level, format and output.
    pub logging: LoggingSection,
    /// Guest script limits.
    pub guest: GuestSection,
    /// Built-in transformation settings.
    pub transform: TransformSection,
    /// Health report settings.
    pub health: HealthSection,
    /// Module harness settings.
    pub harness: HarnessSection,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Base level or filter expression.
    pub level: String,
    /// `pretty`, `compact`, `json` or `full`.
    pub format: String,
    /// Extra filter directives, e.g. `ferry_guest=debug`.
    pub directives: Vec<String>,
    /// Directory for rolling log files. Empty logs to stderr.
    pub directory: String,
    /// `daily`, `hourly` or `never`.
    pub rotation: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            directory: String::new(),
            rotation: "daily".to_owned(),
        }
    }
}

/// `[guest]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuestSection {
    /// Global function called by `transformData`.
    pub entry_point: String,
    /// Heap limit per runtime. `0` disables it.
    pub memory_limit_bytes: u64,
    /// Native stack limit per runtime. `0` disables it.
    pub max_stack_bytes: u64,
    /// Wall-clock budget per call. `0` disables it.
    pub timeout_ms: u64,
}

impl Default for GuestSection {
    fn default() -> Self {
        Self {
            entry_point: "transform".to_owned(),
            memory_limit_bytes: 33_554_432,
            max_stack_bytes: 1_048_576,
            timeout_ms: 5_000,
        }
    }
}

/// `[transform]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSection {
    /// `message` field of the built-in transformation.
    pub message: String,
}

impl Default for TransformSection {
    fn default() -> Self {
        Self {
            message: "Data has been processed by the Ferry host bridge".to_owned(),
        }
    }
}

/// `[health]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSection {
    /// `message` field of the health report.
    pub message: String,
}

impl Default for HealthSection {
    fn default() -> Self {
        Self {
            message: "Ferry host bridge is running".to_owned(),
        }
    }
}

/// `[harness]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSection {
    /// Fuel per module instance. `0` disables metering.
    pub fuel: u64,
    /// Reuse compiled modules with identical bytes.
    pub cache_modules: bool,
    /// Timeout for Extism plugin calls.
    pub plugin_timeout_secs: u64,
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            fuel: 0,
            cache_modules: true,
            plugin_timeout_secs: 10,
        }
    }
}
