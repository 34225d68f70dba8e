//! Guest engine limits.

use std::time::Duration;

/// Entry-point name agreed between callers and guest sources.
pub const DEFAULT_ENTRY_POINT: &str = "transform";

/// Default memory limit per guest runtime: 32 MB.
const DEFAULT_MEMORY_LIMIT_BYTES: usize = 32 * 1024 * 1024;

/// Default native stack limit per guest runtime: 1 MB.
const DEFAULT_MAX_STACK_BYTES: usize = 1024 * 1024;

/// Default wall-clock budget per guest call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Limits applied to every guest runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestConfig {
    /// Global function invoked by [`GuestEngine::transform`](crate::GuestEngine::transform).
    pub entry_point: String,
    /// Heap limit in bytes. `0` disables the limit.
    pub memory_limit_bytes: usize,
    /// Native stack limit in bytes. `0` disables the limit.
    pub max_stack_bytes: usize,
    /// Wall-clock budget for one call, from runtime creation to result.
    pub timeout: Option<Duration>,
    /// Whether to install a `console` object that forwards to tracing.
    pub console: bool,
}

impl Default for GuestConfig {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            memory_limit_bytes: DEFAULT_MEMORY_LIMIT_BYTES,
            max_stack_bytes: DEFAULT_MAX_STACK_BYTES,
            timeout: Some(DEFAULT_TIMEOUT),
            console: true,
        }
    }
}

impl GuestConfig {
    /// Set the entry-point name.
    #[must_use]
    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    /// Set the heap limit in bytes.
    #[must_use]
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit_bytes = bytes;
        self
    }

    /// Set the native stack limit in bytes.
    #[must_use]
    pub fn with_max_stack(mut self, bytes: usize) -> Self {
        self.max_stack_bytes = bytes;
        self
    }

    /// Set or clear the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the `console` shim.
    #[must_use]
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }
}
