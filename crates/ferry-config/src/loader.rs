//! Config file discovery and layered loading.
//!
//! `Config::load()` runs these steps:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `~/.ferry/config.toml` (user)
//! 3. Merge `{workspace}/.ferry/config.toml` (workspace)
//! 4. Apply `FERRY_*` environment overrides
//! 5. Deserialize the merged tree → `Config`
//! 6. Validate
//! 7. Return `ResolvedConfig`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, merge_layer, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
pub(crate) const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Name of the per-user and per-workspace config directory.
const CONFIG_DIR: &str = ".ferry";

/// Load the configuration with layered file precedence.
///
/// `workspace_root` is the root of the current project, usually the working
/// directory. If `None`, the workspace layer is skipped.
///
/// `ferry_home_override` replaces `~/.ferry` for user-level discovery; the
/// user config is read from `{override}/config.toml`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, an environment
/// override cannot be coerced, or the final configuration fails validation.
pub fn load(
    workspace_root: Option<&Path>,
    ferry_home_override: Option<&Path>,
) -> ConfigResult<ResolvedConfig> {
    let user_dir = match ferry_home_override {
        Some(dir) => dir.to_path_buf(),
        None => home_directory()?.join(CONFIG_DIR),
    };
    load_layers(Some(&user_dir), workspace_root, &collect_env_vars())
}

/// Layered load with every input explicit.
pub(crate) fn load_layers<S: std::hash::BuildHasher>(
    user_dir: Option<&Path>,
    workspace_root: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::Parse {
            origin: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", ConfigLayer::Defaults, &mut field_sources);

    let layers = [
        user_dir.map(|dir| (dir.join("config.toml"), ConfigLayer::User)),
        workspace_root.map(|ws| {
            (
                ws.join(CONFIG_DIR).join("config.toml"),
                ConfigLayer::Workspace,
            )
        }),
    ];

    for (path, layer) in layers.into_iter().flatten() {
        let Some(overlay) = try_load_file(&path)? else {
            continue;
        };
        merge_layer(&mut merged, &overlay, layer, &mut field_sources);
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), layer = %layer, "loaded config file");
    }

    let env_count = apply_env_overrides(&mut merged, &mut field_sources, env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable overrides");
    }

    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                origin: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering).
///
/// Sections and fields the file omits take their default values.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = try_load_file(path)?.ok_or_else(|| ConfigError::Read {
        path: path.display().to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    })?;

    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            origin: path.display().to_string(),
            source: e,
        })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::TooLarge {
            path: path.display().to_string(),
            size,
            limit: MAX_CONFIG_FILE_SIZE,
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        origin: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// Determine the user's home directory.
pub(crate) fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults_match_default_impl() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_without_files() {
        let home = tempfile::tempdir().unwrap();
        let resolved = load_layers(Some(home.path()), None, &no_env()).unwrap();

        assert_eq!(resolved.config, Config::default());
        assert!(resolved.loaded_files.is_empty());
        assert_eq!(
            resolved.field_sources.get("guest.entry_point"),
            Some(&ConfigLayer::Defaults)
        );
    }

    #[test]
    fn test_workspace_overrides_user() {
        let home = tempfile::tempdir().unwrap();
        let ws = tempfile::tempdir().unwrap();
        write_config(
            home.path(),
            "[guest]\ntimeout_ms = 100\nentry_point = \"main\"\n",
        );
        write_config(&ws.path().join(".ferry"), "[guest]\ntimeout_ms = 200\n");

        let resolved = load_layers(Some(home.path()), Some(ws.path()), &no_env()).unwrap();

        assert_eq!(resolved.config.guest.timeout_ms, 200);
        assert_eq!(resolved.config.guest.entry_point, "main");
        assert_eq!(resolved.loaded_files.len(), 2);
        assert_eq!(
            resolved.field_sources.get("guest.timeout_ms"),
            Some(&ConfigLayer::Workspace)
        );
        assert_eq!(
            resolved.field_sources.get("guest.entry_point"),
            Some(&ConfigLayer::User)
        );
    }

    #[test]
    fn test_env_overrides_files() {
        let home = tempfile::tempdir().unwrap();
        write_config(home.path(), "[harness]\nfuel = 5\n");
        let env: HashMap<String, String> =
            [("FERRY_HARNESS_FUEL".to_owned(), "9000".to_owned())].into();

        let resolved = load_layers(Some(home.path()), None, &env).unwrap();

        assert_eq!(resolved.config.harness.fuel, 9000);
        assert_eq!(
            resolved.field_sources.get("harness.fuel"),
            Some(&ConfigLayer::Environment)
        );
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let home = tempfile::tempdir().unwrap();
        let path = write_config(home.path(), "[guest\ntimeout_ms = ");

        let err = load_layers(Some(home.path()), None, &no_env()).unwrap_err();
        match err {
            ConfigError::Parse { origin: reported, .. } => {
                assert_eq!(reported, path.display().to_string());
            },
            other => panic!("expected Parse, got: {other:?}"),
        }
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let home = tempfile::tempdir().unwrap();
        write_config(home.path(), "[guest]\ntimeout_ms = \"soon\"\n");

        let err = load_layers(Some(home.path()), None, &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_value_is_validation_error() {
        let ws = tempfile::tempdir().unwrap();
        write_config(&ws.path().join(".ferry"), "[logging]\nformat = \"xml\"\n");

        let err = load_layers(None, Some(ws.path()), &no_env()).unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn test_load_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[transform]\nmessage = \"custom\"\n");

        let config = load_file(&path).unwrap();
        assert_eq!(config.transform.message, "custom");
        assert_eq!(config.guest, crate::types::GuestSection::default());
    }

    #[test]
    fn test_load_file_nonexistent() {
        let result = load_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_try_load_file_missing() {
        let result = try_load_file(Path::new("/nonexistent/config.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_oversized_file_is_rejected() {
        let home = tempfile::tempdir().unwrap();
        let padding = "#".repeat(1_048_577);
        write_config(home.path(), &padding);

        let err = load_layers(Some(home.path()), None, &no_env()).unwrap_err();
        match err {
            ConfigError::TooLarge { size, limit, .. } => {
                assert_eq!(size, 1_048_577);
                assert_eq!(limit, MAX_CONFIG_FILE_SIZE);
            },
            other => panic!("expected TooLarge, got: {other:?}"),
        }
    }
}
