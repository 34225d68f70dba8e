//! Commonly used types.
//!
//! ```rust
//! use ferry_bridge::prelude::*;
//! ```

pub use crate::{
    Bridge, BridgeError, BridgeResult, Contract, Deferred, DeferredState, Operation,
    OperationRegistry, Param, RegistryBuilder,
};
pub use ferry_core::HostValue;
