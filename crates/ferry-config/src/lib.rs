#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Layered configuration for the Ferry host bridge.
//!
//! A single [`Config`] type covers logging, guest limits, the built-in
//! operations and the module harness.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ferry_config::Config;
//!
//! let resolved = Config::load(Some(std::path::Path::new("."))).unwrap();
//! println!("guest entry point: {}", resolved.config.guest.entry_point);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Environment variables** (`FERRY_*`)
//! 2. **Workspace** (`{workspace}/.ferry/config.toml`)
//! 3. **User** (`~/.ferry/config.toml`)
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate has no dependencies on other ferry crates. Conversion to domain
//! types happens in the CLI.

/// `FERRY_*` environment overrides.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging with source tracking.
pub mod merge;
/// Resolved configuration display and serialization.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};
pub use merge::{ConfigLayer, FieldSources};
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed, an
    /// environment override is invalid, or validation fails.
    pub fn load(workspace_root: Option<&Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, None)
    }

    /// Load configuration reading the user layer from `ferry_home` instead of
    /// `~/.ferry`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed, an
    /// environment override is invalid, or validation fails.
    pub fn load_with_home(
        workspace_root: Option<&Path>,
        ferry_home: &Path,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, Some(ferry_home))
    }

    /// The user-level config directory (`~/.ferry`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] if the home directory is unknown.
    pub fn user_dir() -> ConfigResult<PathBuf> {
        loader::home_directory().map(|home| home.join(".ferry"))
    }
}
