//! Bridge from `ferry_config::Config` to domain types.
//!
//! The config crate has no dependency on the domain crates; conversion
//! happens here at CLI startup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ferry_bridge::builtin::BuiltinSettings;
use ferry_config::Config;
use ferry_core::SystemClock;
use ferry_guest::GuestConfig;
use ferry_harness::HarnessConfig;
use ferry_telemetry::{FileRotation, LogConfig, LogFormat};

/// Convert config to [`LogConfig`].
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format: LogFormat = cfg.logging.format.parse().unwrap_or_default();

    let mut log_config = LogConfig::new(&cfg.logging.level).with_format(format);

    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }

    if !cfg.logging.directory.trim().is_empty() {
        let rotation: FileRotation = cfg.logging.rotation.parse().unwrap_or_default();
        log_config = log_config.with_file_logging(
            PathBuf::from(&cfg.logging.directory),
            "ferry",
            rotation,
        );
    }

    log_config
}

/// Convert config to [`GuestConfig`].
///
/// Sizes that do not fit `usize` are rejected by validation before this runs;
/// saturating keeps the conversion total regardless.
pub(crate) fn to_guest_config(cfg: &Config) -> GuestConfig {
    let g = &cfg.guest;
    let timeout = (g.timeout_ms > 0).then(|| Duration::from_millis(g.timeout_ms));

    GuestConfig::default()
        .with_entry_point(&g.entry_point)
        .with_memory_limit(usize::try_from(g.memory_limit_bytes).unwrap_or(usize::MAX))
        .with_max_stack(usize::try_from(g.max_stack_bytes).unwrap_or(usize::MAX))
        .with_timeout(timeout)
}

/// Convert config to [`BuiltinSettings`] for the default registry.
pub(crate) fn to_builtin_settings(cfg: &Config) -> BuiltinSettings {
    BuiltinSettings {
        transform_message: cfg.transform.message.clone(),
        health_message: cfg.health.message.clone(),
        guest: to_guest_config(cfg),
        clock: Arc::new(SystemClock),
    }
}

/// Convert config to [`HarnessConfig`].
pub(crate) fn to_harness_config(cfg: &Config) -> HarnessConfig {
    let h = &cfg.harness;
    let mut harness = HarnessConfig::default()
        .with_cache(h.cache_modules)
        .with_plugin_timeout(Duration::from_secs(h.plugin_timeout_secs));
    if h.fuel > 0 {
        harness = harness.with_fuel(h.fuel);
    }
    harness
}
