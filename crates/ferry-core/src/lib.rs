//! Ferry Core - Shared types for the Ferry host/guest execution bridge.
//!
//! This crate provides:
//! - The canonical [`DocumentValue`] and the JSON [`marshal`] layer
//! - [`HostValue`], the raw argument shape handed over by the calling host
//! - The [`Clock`] seam through which operations read the host's current time

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod clock;
pub mod host;
pub mod marshal;

pub use clock::{Clock, SystemClock, iso_timestamp};
pub use host::HostValue;
pub use marshal::{DocumentValue, MarshalError, MarshalResult, decode, encode, encode_native};
