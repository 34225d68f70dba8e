//! `healthCheck()`.

use ferry_core::{HostValue, encode_native};
use serde::Serialize;

use crate::error::BridgeResult;
use crate::operation::{Contract, Operation};

#[derive(Serialize)]
struct HealthReport<'a> {
    status: &'a str,
    message: &'a str,
}

/// Reports that the bridge is up.
pub struct HealthCheck {
    message: String,
}

impl HealthCheck {
    /// Create the operation.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Operation for HealthCheck {
    fn name(&self) -> &'static str {
        "healthCheck"
    }

    fn contract(&self) -> Contract {
        Contract::new("Report bridge health", Vec::new())
    }

    fn call(&self, _args: &[HostValue]) -> BridgeResult<String> {
        Ok(encode_native(&HealthReport {
            status: "healthy",
            message: &self.message,
        })?)
    }
}
