//! Post-merge configuration validation.
//!
//! Checks that deserialized [`Config`](crate::Config) values are within the
//! ranges the runtime accepts. Every error names the offending field.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Smallest heap limit a QuickJS runtime can start with.
const MIN_MEMORY_LIMIT_BYTES: u64 = 1_048_576;

/// Upper bound on the per-call guest deadline (one hour).
const MAX_TIMEOUT_MS: u64 = 3_600_000;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_guest(config)?;
    validate_messages(config)?;
    validate_harness(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if l.level.trim().is_empty() {
        return Err(invalid("logging.level", "level must not be empty"));
    }

    if !matches!(
        l.format.to_ascii_lowercase().as_str(),
        "pretty" | "compact" | "json" | "full"
    ) {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown format '{}'; expected one of: pretty, compact, json, full",
                l.format
            ),
        ));
    }

    if !matches!(
        l.rotation.to_ascii_lowercase().as_str(),
        "daily" | "hourly" | "never"
    ) {
        return Err(invalid(
            "logging.rotation",
            format!(
                "unknown rotation '{}'; expected one of: daily, hourly, never",
                l.rotation
            ),
        ));
    }

    if let Some(bad) = l.directives.iter().find(|d| d.trim().is_empty()) {
        return Err(invalid(
            "logging.directives",
            format!("directive {bad:?} is empty"),
        ));
    }

    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn validate_guest(config: &Config) -> ConfigResult<()> {
    let g = &config.guest;

    if !is_identifier(&g.entry_point) {
        return Err(invalid(
            "guest.entry_point",
            format!(
                "'{}' is not a valid JavaScript function name",
                g.entry_point
            ),
        ));
    }

    if g.memory_limit_bytes != 0 && g.memory_limit_bytes < MIN_MEMORY_LIMIT_BYTES {
        return Err(invalid(
            "guest.memory_limit_bytes",
            format!(
                "memory_limit_bytes must be 0 (unlimited) or at least {MIN_MEMORY_LIMIT_BYTES}"
            ),
        ));
    }

    if usize::try_from(g.memory_limit_bytes).is_err() {
        return Err(invalid(
            "guest.memory_limit_bytes",
            "memory_limit_bytes does not fit this platform's address space",
        ));
    }

    if usize::try_from(g.max_stack_bytes).is_err() {
        return Err(invalid(
            "guest.max_stack_bytes",
            "max_stack_bytes does not fit this platform's address space",
        ));
    }

    if g.timeout_ms > MAX_TIMEOUT_MS {
        return Err(invalid(
            "guest.timeout_ms",
            format!("timeout_ms ({}) exceeds maximum ({MAX_TIMEOUT_MS})", g.timeout_ms),
        ));
    }

    Ok(())
}

fn validate_messages(config: &Config) -> ConfigResult<()> {
    if config.transform.message.trim().is_empty() {
        return Err(invalid("transform.message", "message must not be empty"));
    }
    if config.health.message.trim().is_empty() {
        return Err(invalid("health.message", "message must not be empty"));
    }
    Ok(())
}

fn validate_harness(config: &Config) -> ConfigResult<()> {
    if config.harness.plugin_timeout_secs == 0 {
        return Err(invalid(
            "harness.plugin_timeout_secs",
            "plugin_timeout_secs must be greater than 0",
        ));
    }
    Ok(())
}
