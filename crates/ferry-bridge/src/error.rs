//! Bridge error types.

use ferry_core::MarshalError;
use ferry_guest::GuestError;
use thiserror::Error;

/// Reasons an invocation is rejected.
///
/// Every variant reaches the caller the same way, as the rejection of the
/// invocation's [`Deferred`](crate::Deferred). Callers tell them apart by
/// message or by [`kind`](Self::kind).
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The caller supplied the wrong number or type of arguments.
    #[error("{operation}: {message}")]
    Argument {
        /// Operation that rejected its arguments.
        operation: String,
        /// What was wrong.
        message: String,
    },

    /// No operation is exposed under this name.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Two operations were registered under one name.
    #[error("operation already registered: {0}")]
    AlreadyRegistered(String),

    /// Input or output document could not be marshaled.
    #[error(transparent)]
    Marshal(#[from] MarshalError),

    /// The guest script failed.
    #[error(transparent)]
    Guest(#[from] GuestError),

    /// The operation panicked; the worker's fault barrier caught it.
    #[error("panic occurred: {0}")]
    Fault(String),

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),

    /// The worker went away without settling the result.
    #[error("worker finished without settling the invocation")]
    WorkerLost,
}

impl BridgeError {
    /// Build an argument error for `operation`.
    pub fn argument(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Argument {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Stable class name of the error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Argument { .. } => "ArgumentError",
            Self::UnknownOperation(_) => "UnknownOperationError",
            Self::AlreadyRegistered(_) => "AlreadyRegisteredError",
            Self::Marshal(MarshalError::Parse { .. }) => "ParseError",
            Self::Marshal(MarshalError::Encode(_)) => "EncodeError",
            Self::Guest(guest) => guest.kind(),
            Self::Fault(_) => "UnrecoverableFault",
            Self::Spawn(_) => "SpawnError",
            Self::WorkerLost => "WorkerLostError",
        }
    }

    /// Whether this rejection came from the fault barrier.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
