//! Guest engine error types.

use thiserror::Error;

/// Errors raised while running guest source.
#[derive(Debug, Error)]
pub enum GuestError {
    /// The interpreter could not be created.
    #[error("failed to create guest runtime: {0}")]
    Init(String),

    /// The guest source does not parse.
    #[error("guest syntax error: {0}")]
    Syntax(String),

    /// The guest source threw while it was being executed.
    #[error("guest runtime error: {0}")]
    Runtime(String),

    /// No callable global binding with the requested name.
    #[error("{name} function not found in JavaScript code")]
    Lookup {
        /// The entry-point name that was looked up.
        name: String,
    },

    /// The entry function threw during the call.
    #[error("JavaScript transformation failed: {0}")]
    Invocation(String),

    /// A value could not cross the host/guest boundary.
    #[error("guest value cannot be marshaled: {0}")]
    Marshal(String),

    /// The guest ran past its execution deadline.
    #[error("guest execution exceeded {limit_ms} ms")]
    Timeout {
        /// Configured limit in milliseconds.
        limit_ms: u128,
    },
}

impl GuestError {
    /// Stable class name of the error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init(_) => "GuestInitError",
            Self::Syntax(_) => "GuestSyntaxError",
            Self::Runtime(_) => "GuestRuntimeError",
            Self::Lookup { .. } => "GuestLookupError",
            Self::Invocation(_) => "GuestInvocationError",
            Self::Marshal(_) => "GuestMarshalError",
            Self::Timeout { .. } => "GuestTimeoutError",
        }
    }
}

/// Result type for guest operations.
pub type GuestResult<T> = Result<T, GuestError>;
