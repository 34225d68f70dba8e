//! Prelude module - commonly used types for convenient import.
//!
//! Use `use ferry_core::prelude::*;` to import all essential types.

pub use crate::{Clock, HostValue, SystemClock, iso_timestamp};
pub use crate::{DocumentValue, MarshalError, MarshalResult, decode, encode, encode_native};
