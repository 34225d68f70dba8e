//! Ferry CLI - host bridge and module harness.
//!
//! Runs the bridge's operations from the command line, one invocation per
//! command, and drives the WebAssembly harness for standalone checks.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ferry_config::{Config, ResolvedConfig};

mod commands;
mod config_bridge;
mod output;
mod theme;

use commands::{bridge, config, module};
use output::OutputFormat;
use theme::Theme;

/// Ferry - run host operations and check WebAssembly modules
#[derive(Parser)]
#[command(name = "ferry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty (default) or json
    #[arg(long, global = true, default_value = "pretty")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a JSON document, with the built-in or a guest script
    Transform {
        /// Input JSON text (read from stdin when neither input flag is given)
        #[arg(short, long, conflicts_with = "input_file")]
        input: Option<String>,

        /// File containing the input JSON
        #[arg(long)]
        input_file: Option<PathBuf>,

        /// JavaScript file defining the transformation function
        #[arg(short, long)]
        script: Option<PathBuf>,
    },

    /// Report bridge health
    Health,

    /// Evaluate a JavaScript snippet with `inputData` bound
    Eval {
        /// Code to evaluate
        #[arg(short, long)]
        code: String,

        /// Text bound to `inputData`
        #[arg(short, long, default_value = "")]
        input: String,
    },

    /// List the exposed operations and their parameters
    Ops,

    /// Load a WebAssembly module, call an export and check the result
    Verify {
        /// Path to the .wasm module
        module: PathBuf,

        /// Export to call
        #[arg(short, long, default_value = "add")]
        export: String,

        /// Arguments, one per parameter (default for `add`: 5 3)
        #[arg(short, long, num_args = 1.., allow_negative_numbers = true)]
        args: Option<Vec<String>>,

        /// Expected result (default for `add` without --args: 8)
        #[arg(long, allow_negative_numbers = true)]
        expect: Option<String>,
    },

    /// List a module's imports and exports
    Inspect {
        /// Path to the .wasm module
        module: PathBuf,
    },

    /// Call a function of an Extism plugin
    Plugin {
        /// Path to the plugin .wasm
        module: PathBuf,

        /// Function to call
        #[arg(short, long)]
        function: String,

        /// Input passed to the function
        #[arg(short, long, default_value = "")]
        input: String,

        /// Expected output
        #[arg(long)]
        expect: Option<String>,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations
    Show {
        /// Show only a specific section (e.g. guest, harness)
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Show config file paths being checked
    Paths,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let workspace_root = std::env::current_dir().ok();
    let loaded = Config::load(workspace_root.as_deref());

    // Set up logging from config, with --verbose override.
    let mut log_config = match &loaded {
        Ok(resolved) => config_bridge::to_log_config(&resolved.config),
        Err(_) => config_bridge::to_log_config(&Config::default()),
    };
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = ferry_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    // `config` reports load errors; every other command falls back to defaults.
    let resolved = match (loaded, &cli.command) {
        (Ok(resolved), _) => resolved,
        (Err(e), Commands::Config { .. }) => return Err(e.into()),
        (Err(e), _) => {
            eprintln!("{}", Theme::error(&format!("Configuration error: {e}")));
            eprintln!("{}", Theme::dimmed("Continuing with built-in defaults."));
            ResolvedConfig::from_config(Config::default())
        },
    };
    let cfg = &resolved.config;
    let format = cli.format;

    match cli.command {
        Commands::Transform {
            input,
            input_file,
            script,
        } => {
            let bridge = bridge::build_bridge(cfg)?;
            bridge::transform(
                &bridge,
                format,
                input,
                input_file.as_deref(),
                script.as_deref(),
            )
            .await?;
        },
        Commands::Health => {
            let bridge = bridge::build_bridge(cfg)?;
            bridge::health(&bridge, format).await;
        },
        Commands::Eval { code, input } => {
            let bridge = bridge::build_bridge(cfg)?;
            bridge::eval(&bridge, format, code, input).await;
        },
        Commands::Ops => {
            let bridge = bridge::build_bridge(cfg)?;
            bridge::list_operations(&bridge, format)?;
        },
        Commands::Verify {
            module: path,
            export,
            args,
            expect,
        } => {
            let spec = module::check_spec(&path, &export, args, expect);
            module::verify(cfg, format, &spec)?;
        },
        Commands::Inspect { module: path } => {
            module::inspect_module(cfg, format, &path)?;
        },
        Commands::Plugin {
            module: path,
            function,
            input,
            expect,
        } => {
            module::plugin(cfg, format, &path, &function, &input, expect.as_deref())?;
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show { section } => {
                config::show_config(&resolved, format, section.as_deref())?;
            },
            ConfigCommands::Paths => config::show_paths(workspace_root.as_deref()),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_verify_defaults() {
        let cli = Cli::try_parse_from(["ferry", "verify", "m.wasm"]).unwrap();
        match cli.command {
            Commands::Verify {
                export,
                args,
                expect,
                ..
            } => {
                assert_eq!(export, "add");
                assert!(args.is_none());
                assert!(expect.is_none());
            },
            _ => panic!("expected verify"),
        }
    }

    #[test]
    fn test_parse_verify_negative_args() {
        let cli = Cli::try_parse_from([
            "ferry", "verify", "m.wasm", "--args", "-2", "7", "--expect", "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Verify { args, expect, .. } => {
                assert_eq!(args.unwrap(), vec!["-2", "7"]);
                assert_eq!(expect.as_deref(), Some("5"));
            },
            _ => panic!("expected verify"),
        }
    }

    #[test]
    fn test_global_json_format() {
        let cli = Cli::try_parse_from(["ferry", "health", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(Cli::try_parse_from(["ferry", "--format", "yaml", "health"]).is_err());
    }

    #[test]
    fn test_config_show_uses_global_format() {
        let cli = Cli::try_parse_from(["ferry", "config", "show", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Config {
                command: ConfigCommands::Show { section },
            } => assert!(section.is_none()),
            _ => panic!("expected config show"),
        }
    }

    #[test]
    fn test_input_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "ferry",
            "transform",
            "--input",
            "{}",
            "--input-file",
            "in.json",
        ]);
        assert!(parsed.is_err());
    }
}
