//! Ferry Test - Shared test utilities for the Ferry workspace.
//!
//! Binary module fixtures are assembled in memory with `wasm-encoder`, so no
//! test depends on a prebuilt `.wasm` file.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! ferry-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use ferry_test::fixtures;
//!
//! let bytes = fixtures::add_module();
//! let compiled = harness.compile(&bytes)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod clock;
pub mod fixtures;
pub mod scripts;

pub use clock::FixedClock;
