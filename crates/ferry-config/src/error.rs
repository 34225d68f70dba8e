use std::io;

use thiserror::Error;

/// Failure to produce a usable [`Config`](crate::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// File path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A layer is not valid TOML, or has the wrong shape for a field.
    #[error("{origin} is not a valid ferry config: {source}")]
    Parse {
        /// File path, or a placeholder such as `<merged config>`.
        origin: String,
        /// TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A config file is larger than the loader accepts.
    #[error("{path} is {size} bytes, over the {limit} byte limit for config files")]
    TooLarge {
        /// File path.
        path: String,
        /// Actual size.
        size: u64,
        /// Accepted maximum.
        limit: u64,
    },

    /// A field has a value outside its accepted range.
    #[error("invalid value for {field}: {message}")]
    Invalid {
        /// Dotted field path, e.g. `guest.timeout_ms`.
        field: String,
        /// What is wrong.
        message: String,
    },

    /// A `FERRY_*` variable could not be coerced to its field's type.
    #[error("{variable}: {message}")]
    Env {
        /// Variable name.
        variable: String,
        /// What is wrong.
        message: String,
    },

    /// No home directory to look for `~/.ferry` in.
    #[error("home directory could not be determined")]
    NoHomeDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
