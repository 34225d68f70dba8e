//! Ferry Harness - Invoke exported functions of precompiled WebAssembly
//! modules and verify their results.
//!
//! The flow is synchronous and strictly linear:
//!
//! 1. [`ModuleHarness::compile`] bytes into a [`CompiledModule`]
//! 2. [`ModuleHarness::instantiate`] it against an [`ImportSet`]
//! 3. [`ModuleInstance::resolve_export`] a function by name
//! 4. [`ModuleInstance::call`] it with typed [`Number`] arguments
//! 5. [`verify`] the result against an expectation
//!
//! [`ModuleHarness::run_check`] bundles all five steps. [`inspect`] lists a
//! module's imports and exports without compiling it, and [`PluginRunner`]
//! calls string-in/string-out exports of Extism plugins.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod check;
mod error;
mod harness;
mod imports;
mod inspect;
mod instance;
mod number;
mod plugin;

pub use check::{CheckReport, CheckSpec, ModuleSource};
pub use error::{HarnessError, HarnessResult};
pub use harness::{CompiledModule, HarnessConfig, ModuleHarness};
pub use imports::{HostFn, ImportSet};
pub use inspect::{ExportInfo, ExternKind, ImportInfo, ModuleInfo, inspect};
pub use instance::{ExportedFunc, ModuleInstance};
pub use number::{Number, NumberKind, ParseNumberError};
pub use plugin::PluginRunner;

/// Compare a result with its expectation.
///
/// # Errors
///
/// Returns [`HarnessError::Mismatch`] if they differ in kind or value.
pub fn verify(actual: Number, expected: Number) -> HarnessResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::Mismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}
