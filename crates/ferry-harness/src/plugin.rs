//! Calls into Extism plugins.

use std::path::Path;
use std::time::Duration;

use extism::{Manifest, Plugin, PluginBuilder, Wasm};
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};
use crate::inspect::inspect;

/// A loaded Extism plugin whose string-in/string-out exports can be called
/// and checked.
pub struct PluginRunner {
    plugin: Plugin,
    exports: Vec<String>,
}

impl PluginRunner {
    /// Load a plugin from bytes.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::Inspect`] if the bytes do not parse
    /// - [`HarnessError::Plugin`] if Extism rejects the module
    pub fn load(bytes: Vec<u8>, timeout: Duration) -> HarnessResult<Self> {
        let exports = inspect(&bytes)?.function_exports();
        let manifest = Manifest::new([Wasm::data(bytes)]).with_timeout(timeout);
        let plugin = PluginBuilder::new(manifest)
            .with_wasi(true)
            .build()
            .map_err(|e| HarnessError::Plugin(format!("failed to build Extism plugin: {e}")))?;
        debug!(exports = exports.len(), "Extism plugin loaded");
        Ok(Self { plugin, exports })
    }

    /// Load a plugin file.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Io`] if the file cannot be read, otherwise as
    /// [`load`](Self::load).
    pub fn load_file(path: &Path, timeout: Duration) -> HarnessResult<Self> {
        let bytes = std::fs::read(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(bytes, timeout)
    }

    /// Function exports of the plugin.
    #[must_use]
    pub fn exports(&self) -> &[String] {
        &self.exports
    }

    /// Whether the plugin exports `function`.
    #[must_use]
    pub fn has_function(&self, function: &str) -> bool {
        self.plugin.function_exists(function)
    }

    /// Call `function` with `input` and return its output.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::ExportNotFound`] if there is no such export
    /// - [`HarnessError::Plugin`] if the call fails
    pub fn call(&mut self, function: &str, input: &str) -> HarnessResult<String> {
        if !self.has_function(function) {
            return Err(HarnessError::ExportNotFound {
                name: function.to_string(),
                available: self.exports.clone(),
            });
        }
        self.plugin
            .call::<&str, String>(function, input)
            .map_err(|e| HarnessError::Plugin(format!("{function} failed: {e}")))
    }

    /// Call `function` and require `expected` as output.
    ///
    /// # Errors
    ///
    /// As [`call`](Self::call), plus [`HarnessError::Mismatch`] on a wrong
    /// output.
    pub fn expect(&mut self, function: &str, input: &str, expected: &str) -> HarnessResult<String> {
        let output = self.call(function, input)?;
        if output == expected {
            Ok(output)
        } else {
            Err(HarnessError::Mismatch {
                expected: expected.to_string(),
                actual: output,
            })
        }
    }
}

impl std::fmt::Debug for PluginRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRunner")
            .field("exports", &self.exports)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_wasm() {
        let err = PluginRunner::load(b"plain text".to_vec(), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, HarnessError::Inspect(_)), "got: {err:?}");
    }

    #[test]
    fn missing_file() {
        let err = PluginRunner::load_file(Path::new("/no/such/plugin.wasm"), Duration::from_secs(1))
            .unwrap_err();
        assert_eq!(err.kind(), "IoError");
    }
}
