//! Ferry Guest - Embedded JavaScript engine for caller-supplied transformations.
//!
//! Every call gets a brand-new QuickJS runtime. Nothing a script defines
//! survives past the call that ran it, so concurrent and successive callers
//! never observe each other's globals.
//!
//! # Example
//!
//! ```rust,no_run
//! use ferry_guest::{GuestConfig, GuestEngine};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), ferry_guest::GuestError> {
//! let engine = GuestEngine::new(GuestConfig::default());
//! let output = engine.transform(
//!     "function transform(x) { return { ...x, doubled: true }; }",
//!     &json!({"n": 5}),
//! )?;
//! assert_eq!(output, json!({"n": 5, "doubled": true}));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod config;
mod console;
mod convert;
mod engine;
mod error;
mod runtime;

pub use config::{DEFAULT_ENTRY_POINT, GuestConfig};
pub use engine::GuestEngine;
pub use error::{GuestError, GuestResult};
pub use runtime::{EntryPoint, GuestRuntime};
