//! `FERRY_*` environment overrides.
//!
//! Environment variables are the topmost layer: a variable that is set wins
//! over every config file. Values are coerced to the type of the field they
//! target, and a value that does not coerce is an error rather than being
//! silently ignored.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources};

/// Target type of an environment override.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    Integer,
    Boolean,
}

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: FieldKind,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "FERRY_LOG_LEVEL",
        field_path: "logging.level",
        kind: FieldKind::Text,
    },
    EnvMapping {
        var_name: "FERRY_LOG_FORMAT",
        field_path: "logging.format",
        kind: FieldKind::Text,
    },
    EnvMapping {
        var_name: "FERRY_GUEST_ENTRY_POINT",
        field_path: "guest.entry_point",
        kind: FieldKind::Text,
    },
    EnvMapping {
        var_name: "FERRY_GUEST_TIMEOUT_MS",
        field_path: "guest.timeout_ms",
        kind: FieldKind::Integer,
    },
    EnvMapping {
        var_name: "FERRY_HARNESS_FUEL",
        field_path: "harness.fuel",
        kind: FieldKind::Integer,
    },
    EnvMapping {
        var_name: "FERRY_HARNESS_CACHE_MODULES",
        field_path: "harness.cache_modules",
        kind: FieldKind::Boolean,
    },
];

/// Names of every recognised `FERRY_*` variable.
#[must_use]
pub fn known_variables() -> Vec<&'static str> {
    ENV_MAPPINGS.iter().map(|m| m.var_name).collect()
}

/// Apply environment overrides on top of the merged file layers.
///
/// Returns the number of variables applied.
///
/// # Errors
///
/// Returns [`ConfigError::Env`] when a variable's value cannot be
/// coerced to the type of its field.
pub fn apply_env_overrides<S: BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };

        let value = coerce(mapping, raw)?;
        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var override"
        );

        set_field(merged, mapping.field_path, value);
        sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
        count = count.saturating_add(1);
    }

    Ok(count)
}

fn coerce(mapping: &EnvMapping, raw: &str) -> ConfigResult<toml::Value> {
    let trimmed = raw.trim();
    match mapping.kind {
        FieldKind::Text => Ok(toml::Value::String(trimmed.to_owned())),
        FieldKind::Integer => trimmed
            .parse::<u64>()
            .ok()
            .and_then(|n| i64::try_from(n).ok())
            .map(toml::Value::Integer)
            .ok_or_else(|| ConfigError::Env {
                variable: mapping.var_name.to_owned(),
                message: format!("expected a non-negative integer, got `{raw}`"),
            }),
        FieldKind::Boolean => {
            trimmed
                .parse::<bool>()
                .map(toml::Value::Boolean)
                .map_err(|_| ConfigError::Env {
                    variable: mapping.var_name.to_owned(),
                    message: format!("expected `true` or `false`, got `{raw}`"),
                })
        },
    }
}

/// Set the leaf at `path`, creating intermediate tables as needed.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut current = root;
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), value);
    }
}

/// Collect the current `FERRY_*` environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with("FERRY_"))
        .collect()
}
