//! CLI handlers for the `ferry config` subcommand.

use std::path::Path;

use anyhow::Result;
use ferry_config::{ResolvedConfig, ShowFormat, env};

use crate::output::OutputFormat;
use crate::theme::Theme;

/// Show the resolved configuration with source annotations.
pub(crate) fn show_config(
    resolved: &ResolvedConfig,
    format: OutputFormat,
    section: Option<&str>,
) -> Result<()> {
    let show_format = match format {
        OutputFormat::Json => ShowFormat::Json,
        OutputFormat::Pretty => ShowFormat::Toml,
    };

    let output = resolved.show(show_format, section)?;

    println!("{output}");
    Ok(())
}

/// Show all config file paths that are checked.
pub(crate) fn show_paths(workspace: Option<&Path>) {
    let home = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf());
    let paths = ResolvedConfig::config_paths(home.as_deref(), workspace);

    println!(
        "{}",
        Theme::header("Configuration files (lowest to highest precedence):")
    );
    println!("  0. <embedded defaults>");
    for (i, path) in paths.iter().enumerate() {
        let status = if Path::new(path).exists() {
            "found"
        } else {
            "not found"
        };
        println!("  {}. {path}  [{status}]", i.saturating_add(1));
    }

    println!(
        "\n{}",
        Theme::header("Environment overrides (highest precedence):")
    );
    for var in env::known_variables() {
        println!("  {var}");
    }
}
