//! Rendering of the resolved configuration for `ferry config show`.
//!
//! TOML output tags each `key = value` line with the layer that set it.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources};
use crate::types::Config;

/// Outcome of a layered load.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Merged and validated configuration.
    pub config: Config,
    /// Layer that set each dotted field path. Absent paths are defaults.
    pub field_sources: FieldSources,
    /// Files that contributed, lowest precedence first.
    pub loaded_files: Vec<String>,
}

/// Rendering for [`ResolvedConfig::show`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// Annotated TOML.
    Toml,
    /// Plain pretty JSON.
    Json,
}

fn render_err(e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        field: "<render>".to_owned(),
        message: e.to_string(),
    }
}

impl ResolvedConfig {
    /// Wrap a configuration that did not come from any file.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            field_sources: FieldSources::new(),
            loaded_files: Vec::new(),
        }
    }

    /// Render the whole configuration or one `section` of it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming `section` when there is no such
    /// section.
    pub fn show(&self, format: ShowFormat, section: Option<&str>) -> ConfigResult<String> {
        let tree = self.tree(section)?;
        match format {
            ShowFormat::Json => serde_json::to_string_pretty(&tree).map_err(render_err),
            ShowFormat::Toml => {
                let body = toml::to_string_pretty(&tree).map_err(render_err)?;
                self.annotate(&body, section).map_err(render_err)
            },
        }
    }

    fn tree(&self, section: Option<&str>) -> ConfigResult<toml::Value> {
        let root = toml::Value::try_from(&self.config).map_err(render_err)?;
        let Some(name) = section else {
            return Ok(root);
        };
        root.get(name).cloned().ok_or_else(|| ConfigError::Invalid {
            field: name.to_owned(),
            message: "no such section; expected logging, guest, transform, health or harness"
                .to_owned(),
        })
    }

    fn annotate(&self, body: &str, section: Option<&str>) -> Result<String, std::fmt::Error> {
        let mut out = String::from("# Resolved Ferry Configuration\n");
        out.push_str("# Source annotations: [defaults] [user] [workspace] [environment]\n");
        if !self.loaded_files.is_empty() {
            out.push_str("#\n# Loaded files (in precedence order):\n");
            for (n, path) in (1_usize..).zip(&self.loaded_files) {
                writeln!(out, "#   {n}. {path}")?;
            }
        }
        out.push('\n');

        let mut table = section.unwrap_or_default().to_owned();
        for line in body.lines() {
            let trimmed = line.trim();
            if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
                table = section.map_or_else(|| header.to_owned(), |s| format!("{s}.{header}"));
                writeln!(out, "{line}")?;
                continue;
            }
            match setting_key(trimmed) {
                Some(key) => {
                    let path = if table.is_empty() {
                        key.to_owned()
                    } else {
                        format!("{table}.{key}")
                    };
                    let layer = self
                        .field_sources
                        .get(&path)
                        .copied()
                        .unwrap_or(ConfigLayer::Defaults);
                    writeln!(out, "{line}  # [{layer}]")?;
                },
                None => writeln!(out, "{line}")?,
            }
        }
        Ok(out)
    }

    /// The user and workspace file locations the loader checks.
    #[must_use]
    pub fn config_paths(home_dir: Option<&Path>, workspace_root: Option<&Path>) -> Vec<String> {
        let in_dot_ferry =
            |dir: &Path| dir.join(".ferry").join("config.toml").display().to_string();
        vec![
            home_dir.map_or_else(|| "~/.ferry/config.toml".to_owned(), in_dot_ferry),
            workspace_root.map_or_else(|| "{workspace}/.ferry/config.toml".to_owned(), in_dot_ferry),
        ]
    }
}

/// Key of a `key = value` line. Array continuation lines have none.
fn setting_key(line: &str) -> Option<&str> {
    let (key, _) = line.split_once('=')?;
    let key = key.trim();
    let plain = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    (plain && !line.starts_with('#')).then_some(key)
}
