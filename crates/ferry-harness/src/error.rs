//! Harness error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading, invoking or verifying a module.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The module file could not be read.
    #[error("failed to read module {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a valid module.
    #[error("failed to compile module: {0}")]
    Compile(String),

    /// Imports could not be satisfied, or instantiation failed.
    #[error("failed to instantiate module: {0}")]
    Link(String),

    /// No function export with this name.
    #[error("export `{name}` not found (available: {})", display_list(.available))]
    ExportNotFound {
        /// Requested export.
        name: String,
        /// Function exports the module does have.
        available: Vec<String>,
    },

    /// Arguments do not match the export's parameters.
    #[error("cannot call `{export}`: {message}")]
    Signature {
        /// Export being called.
        export: String,
        /// What did not match.
        message: String,
    },

    /// The module trapped, including running out of fuel.
    #[error("module trapped: {0}")]
    Trap(String),

    /// The call failed for a reason other than a trap.
    #[error("call failed: {0}")]
    Call(String),

    /// The call succeeded but returned the wrong value.
    #[error("verification failed: expected {expected}, got {actual}")]
    Mismatch {
        /// Expected value.
        expected: String,
        /// Actual value.
        actual: String,
    },

    /// Extism plugin failure.
    #[error("plugin error: {0}")]
    Plugin(String),

    /// The module could not be parsed for inspection.
    #[error("failed to parse module: {0}")]
    Inspect(String),
}

fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

impl HarnessError {
    /// Whether this is a failed expectation rather than an execution error.
    #[must_use]
    pub fn is_verification_failure(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }

    /// Stable class name of the error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IoError",
            Self::Compile(_) => "CompileError",
            Self::Link(_) => "LinkError",
            Self::ExportNotFound { .. } => "ExportNotFoundError",
            Self::Signature { .. } => "SignatureError",
            Self::Trap(_) => "TrapError",
            Self::Call(_) => "CallError",
            Self::Mismatch { .. } => "VerificationError",
            Self::Plugin(_) => "PluginError",
            Self::Inspect(_) => "InspectError",
        }
    }
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_not_found_lists_available() {
        let err = HarnessError::ExportNotFound {
            name: "add".into(),
            available: vec!["sub".into(), "mul".into()],
        };
        assert_eq!(err.to_string(), "export `add` not found (available: sub, mul)");

        let err = HarnessError::ExportNotFound {
            name: "add".into(),
            available: Vec::new(),
        };
        assert!(err.to_string().ends_with("(available: none)"));
        assert_eq!(err.kind(), "ExportNotFoundError");
    }

    #[test]
    fn only_mismatch_is_verification_failure() {
        assert!(!HarnessError::Trap("unreachable".into()).is_verification_failure());
        assert!(
            HarnessError::Mismatch {
                expected: "8".into(),
                actual: "9".into()
            }
            .is_verification_failure()
        );
    }
}
