//! Ferry Bridge - Asynchronous invocation of host operations.
//!
//! Callers invoke an operation by name and get a [`Deferred`] back at once.
//! The operation runs on its own worker thread behind a fault barrier: a
//! panic inside an operation becomes an ordinary rejection and never reaches
//! the caller's thread or any other in-flight invocation.
//!
//! # Example
//!
//! ```rust,no_run
//! use ferry_bridge::{Bridge, builtin};
//! use ferry_core::HostValue;
//!
//! # async fn run() -> Result<(), ferry_bridge::BridgeError> {
//! let bridge = Bridge::new(builtin::default_registry(builtin::BuiltinSettings::default())?);
//! let output = bridge
//!     .invoke("transformData", vec![HostValue::from(r#"{"a":1}"#)])
//!     .await?;
//! println!("{output}");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod builtin;
pub mod prelude;

mod bridge;
mod deferred;
mod error;
mod operation;

pub use bridge::{Bridge, OperationInfo};
pub use deferred::{Deferred, DeferredState, Settler, deferred};
pub use error::{BridgeError, BridgeResult};
pub use operation::{Contract, Operation, OperationRegistry, Param, RegistryBuilder};
