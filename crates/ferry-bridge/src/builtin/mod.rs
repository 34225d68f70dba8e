//! Operations exposed by default: `transformData`, `healthCheck` and
//! `evaluateScript`.

mod evaluate_script;
mod health_check;
mod transform_data;

use std::sync::Arc;

use ferry_core::{Clock, SystemClock};
use ferry_guest::{GuestConfig, GuestEngine};

pub use evaluate_script::EvaluateScript;
pub use health_check::HealthCheck;
pub use transform_data::TransformData;

use crate::error::BridgeResult;
use crate::operation::OperationRegistry;

/// Default `message` of the built-in transformation.
pub const DEFAULT_TRANSFORM_MESSAGE: &str = "Data has been processed by the Ferry host bridge";

/// Default `message` of the health report.
pub const DEFAULT_HEALTH_MESSAGE: &str = "Ferry host bridge is running";

/// Settings shared by the built-in operations.
#[derive(Clone)]
pub struct BuiltinSettings {
    /// `message` field of the built-in transformation output.
    pub transform_message: String,
    /// `message` field of the health report.
    pub health_message: String,
    /// Limits for guest scripts.
    pub guest: GuestConfig,
    /// Source of the built-in transformation's `timestamp`.
    pub clock: Arc<dyn Clock>,
}

impl Default for BuiltinSettings {
    fn default() -> Self {
        Self {
            transform_message: DEFAULT_TRANSFORM_MESSAGE.to_string(),
            health_message: DEFAULT_HEALTH_MESSAGE.to_string(),
            guest: GuestConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl std::fmt::Debug for BuiltinSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinSettings")
            .field("transform_message", &self.transform_message)
            .field("health_message", &self.health_message)
            .field("guest", &self.guest)
            .finish_non_exhaustive()
    }
}

/// Registry holding every built-in operation.
///
/// # Errors
///
/// Only fails if two built-ins share a name.
pub fn default_registry(settings: BuiltinSettings) -> BridgeResult<OperationRegistry> {
    let engine = GuestEngine::new(settings.guest.clone());
    Ok(OperationRegistry::builder()
        .register(TransformData::new(
            engine.clone(),
            Arc::clone(&settings.clock),
            settings.transform_message,
        ))?
        .register(HealthCheck::new(settings.health_message))?
        .register(EvaluateScript::new(engine))?
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_names() {
        let registry = default_registry(BuiltinSettings::default()).unwrap();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            ["evaluateScript", "healthCheck", "transformData"]
        );
    }
}
