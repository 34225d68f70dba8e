//! High-level entry: one fresh runtime per call.

use ferry_core::DocumentValue;
use tracing::debug;

use crate::config::GuestConfig;
use crate::error::GuestResult;
use crate::runtime::GuestRuntime;

/// Global the raw input text is bound to by [`GuestEngine::evaluate`].
const INPUT_GLOBAL: &str = "inputData";

/// Runs caller-supplied guest sources.
///
/// Holds only configuration. Each call builds and tears down its own
/// [`GuestRuntime`], so an engine can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct GuestEngine {
    config: GuestConfig,
}

impl GuestEngine {
    /// Create an engine with the given limits.
    #[must_use]
    pub fn new(config: GuestConfig) -> Self {
        Self { config }
    }

    /// Limits applied to each call.
    #[must_use]
    pub fn config(&self) -> &GuestConfig {
        &self.config
    }

    /// Execute `source`, then call its entry function with `input`.
    ///
    /// # Errors
    ///
    /// Any [`GuestError`](crate::GuestError) from runtime creation, execution,
    /// lookup, invocation or result marshaling.
    pub fn transform(&self, source: &str, input: &DocumentValue) -> GuestResult<DocumentValue> {
        let runtime = GuestRuntime::new(&self.config)?;
        runtime.execute(source)?;
        let entry = runtime.resolve_function(&self.config.entry_point)?;
        debug!(entry = entry.name(), "Invoking guest transformation");
        runtime.invoke(entry, std::slice::from_ref(input))
    }

    /// Evaluate `source` with `input_text` bound to the global `inputData`
    /// and return the completion value as text.
    ///
    /// # Errors
    ///
    /// Any [`GuestError`](crate::GuestError) from runtime creation or
    /// evaluation.
    pub fn evaluate(&self, source: &str, input_text: &str) -> GuestResult<String> {
        let runtime = GuestRuntime::new(&self.config)?;
        runtime.set_global_text(INPUT_GLOBAL, input_text)?;
        runtime.evaluate(source)
    }
}
