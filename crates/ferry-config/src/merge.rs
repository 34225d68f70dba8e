//! Layer merging on raw TOML trees.
//!
//! Layers are merged before deserialization, so a key an upper layer leaves
//! out keeps the value from the layer below. Every leaf written is recorded
//! against the layer that wrote it.

use std::collections::HashMap;
use std::fmt;

/// Origin of a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayer {
    /// `defaults.toml` compiled into the binary.
    Defaults,
    /// `~/.ferry/config.toml`.
    User,
    /// `{workspace}/.ferry/config.toml`.
    Workspace,
    /// A `FERRY_*` variable.
    Environment,
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Defaults => "defaults",
            Self::User => "user (~/.ferry/config.toml)",
            Self::Workspace => "workspace (.ferry/config.toml)",
            Self::Environment => "environment variable",
        })
    }
}

/// Dotted field path to the layer that last set it.
pub type FieldSources = HashMap<String, ConfigLayer>;

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

/// Apply `overlay` on top of `base`.
///
/// Tables are merged key by key. Anything else, arrays included, replaces
/// what was there.
pub fn merge_layer(
    base: &mut toml::Value,
    overlay: &toml::Value,
    layer: ConfigLayer,
    sources: &mut FieldSources,
) {
    merge_at(base, overlay, "", layer, sources);
}

fn merge_at(
    base: &mut toml::Value,
    overlay: &toml::Value,
    path: &str,
    layer: ConfigLayer,
    sources: &mut FieldSources,
) {
    let (toml::Value::Table(into), toml::Value::Table(from)) = (&mut *base, overlay) else {
        *base = overlay.clone();
        record_leaves(overlay, path, layer, sources);
        return;
    };

    for (key, value) in from {
        let child = join(path, key);
        match into.get_mut(key) {
            Some(existing) => merge_at(existing, value, &child, layer, sources),
            None => {
                into.insert(key.clone(), value.clone());
                record_leaves(value, &child, layer, sources);
            },
        }
    }
}

/// Attribute every leaf under `value` to `layer`.
pub(crate) fn record_leaves(
    value: &toml::Value,
    path: &str,
    layer: ConfigLayer,
    sources: &mut FieldSources,
) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                record_leaves(child, &join(path, key), layer, sources);
            }
        },
        _ => {
            sources.insert(path.to_owned(), layer);
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> toml::Value {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn overlay_replaces_only_present_keys() {
        let mut base = parse("[guest]\ntimeout_ms = 5000\nentry_point = \"transform\"\n");
        let overlay = parse("[guest]\ntimeout_ms = 250\n");
        let mut sources = FieldSources::new();

        merge_layer(&mut base, &overlay, ConfigLayer::User, &mut sources);

        assert_eq!(base["guest"]["timeout_ms"].as_integer(), Some(250));
        assert_eq!(base["guest"]["entry_point"].as_str(), Some("transform"));
        assert_eq!(sources.get("guest.timeout_ms"), Some(&ConfigLayer::User));
        assert!(!sources.contains_key("guest.entry_point"));
    }

    #[test]
    fn arrays_are_replaced_not_appended() {
        let mut base = parse("[logging]\ndirectives = [\"a=debug\", \"b=trace\"]\n");
        let overlay = parse("[logging]\ndirectives = [\"c=warn\"]\n");
        let mut sources = FieldSources::new();

        merge_layer(&mut base, &overlay, ConfigLayer::Workspace, &mut sources);

        let directives = base["logging"]["directives"].as_array().unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].as_str(), Some("c=warn"));
        assert_eq!(
            sources.get("logging.directives"),
            Some(&ConfigLayer::Workspace)
        );
    }

    #[test]
    fn new_tables_record_every_leaf() {
        let mut base = parse("[guest]\ntimeout_ms = 1\n");
        let overlay = parse("[harness]\nfuel = 10\ncache_modules = false\n");
        let mut sources = FieldSources::new();

        merge_layer(&mut base, &overlay, ConfigLayer::Workspace, &mut sources);

        assert_eq!(sources.get("harness.fuel"), Some(&ConfigLayer::Workspace));
        assert_eq!(
            sources.get("harness.cache_modules"),
            Some(&ConfigLayer::Workspace)
        );
    }

    #[test]
    fn record_leaves_from_root() {
        let mut sources = FieldSources::new();
        record_leaves(
            &parse("[health]\nmessage = \"up\"\n"),
            "",
            ConfigLayer::Defaults,
            &mut sources,
        );
        assert_eq!(sources.len(), 1);
        assert_eq!(sources.get("health.message"), Some(&ConfigLayer::Defaults));
    }

    #[test]
    fn layer_display() {
        assert_eq!(ConfigLayer::Defaults.to_string(), "defaults");
        assert!(ConfigLayer::User.to_string().contains("~/.ferry"));
    }
}
