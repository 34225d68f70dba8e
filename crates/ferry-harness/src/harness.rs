//! Engine setup, compilation and instantiation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info};
use wasmtime::{Config, Engine, Linker, Module, Store, Trap};

use crate::check::{CheckReport, CheckSpec};
use crate::error::{HarnessError, HarnessResult};
use crate::imports::ImportSet;
use crate::instance::ModuleInstance;

/// Default timeout for Extism plugin calls.
const DEFAULT_PLUGIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Harness settings.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Fuel given to each instance. `None` disables metering.
    pub fuel: Option<u64>,
    /// Reuse compiled modules for identical bytes.
    pub cache_modules: bool,
    /// Timeout for Extism plugin calls.
    pub plugin_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            fuel: None,
            cache_modules: true,
            plugin_timeout: DEFAULT_PLUGIN_TIMEOUT,
        }
    }
}

impl HarnessConfig {
    /// Meter execution with `fuel` units per instance.
    #[must_use]
    pub fn with_fuel(mut self, fuel: u64) -> Self {
        self.fuel = Some(fuel);
        self
    }

    /// Enable or disable the compiled-module cache.
    #[must_use]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_modules = enabled;
        self
    }

    /// Set the Extism call timeout.
    #[must_use]
    pub fn with_plugin_timeout(mut self, timeout: Duration) -> Self {
        self.plugin_timeout = timeout;
        self
    }

    fn to_wasmtime_config(&self) -> Config {
        let mut config = Config::new();
        config.consume_fuel(self.fuel.is_some());
        config
    }
}

/// A validated, compiled module.
///
/// Cheap to clone; clones share the compiled code.
#[derive(Clone)]
pub struct CompiledModule {
    pub(crate) module: Module,
    hash: blake3::Hash,
}

impl CompiledModule {
    /// Content hash of the original bytes.
    #[must_use]
    pub fn hash(&self) -> String {
        self.hash.to_hex().to_string()
    }

    /// Names of the module's function exports, in declaration order.
    #[must_use]
    pub fn function_exports(&self) -> Vec<String> {
        self.module
            .exports()
            .filter(|e| e.ty().func().is_some())
            .map(|e| e.name().to_string())
            .collect()
    }
}

impl std::fmt::Debug for CompiledModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledModule")
            .field("hash", &self.hash())
            .finish_non_exhaustive()
    }
}

/// Compiles and instantiates modules on a shared engine.
pub struct ModuleHarness {
    engine: Engine,
    config: HarnessConfig,
    cache: Mutex<HashMap<blake3::Hash, CompiledModule>>,
}

impl ModuleHarness {
    /// Create a harness.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Compile`] if the engine cannot be configured.
    pub fn new(config: HarnessConfig) -> HarnessResult<Self> {
        let engine = Engine::new(&config.to_wasmtime_config())
            .map_err(|e| HarnessError::Compile(format!("engine setup: {e}")))?;
        Ok(Self {
            engine,
            config,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Create a harness with default settings.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_defaults() -> HarnessResult<Self> {
        Self::new(HarnessConfig::default())
    }

    /// Harness settings.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Read and compile a module file.
    ///
    /// # Errors
    ///
    /// [`HarnessError::Io`] if the file cannot be read, otherwise as
    /// [`compile`](Self::compile).
    pub fn load(&self, path: &Path) -> HarnessResult<CompiledModule> {
        let bytes = std::fs::read(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "Read module file");
        self.compile(&bytes)
    }

    /// Validate and compile module bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Compile`] for malformed or invalid modules.
    pub fn compile(&self, bytes: &[u8]) -> HarnessResult<CompiledModule> {
        let hash = blake3::hash(bytes);

        if self.config.cache_modules {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.get(&hash) {
                debug!(hash = %hash.to_hex(), "Module cache hit");
                return Ok(cached.clone());
            }
        }

        let module =
            Module::new(&self.engine, bytes).map_err(|e| HarnessError::Compile(format!("{e:#}")))?;
        let compiled = CompiledModule { module, hash };

        if self.config.cache_modules {
            self.cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(hash, compiled.clone());
        }

        info!(hash = %hash.to_hex(), "Module compiled");
        Ok(compiled)
    }

    /// Number of cached compiled modules.
    #[must_use]
    pub fn cached_modules(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Instantiate a compiled module with the given imports.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::Link`] if an import is missing or mistyped
    /// - [`HarnessError::Trap`] if the module's start function traps
    pub fn instantiate(
        &self,
        module: &CompiledModule,
        imports: &ImportSet,
    ) -> HarnessResult<ModuleInstance> {
        let mut store = Store::new(&self.engine, ());
        if let Some(fuel) = self.config.fuel {
            store
                .set_fuel(fuel)
                .map_err(|e| HarnessError::Link(format!("fuel: {e}")))?;
        }

        let mut linker = Linker::new(&self.engine);
        imports.define(&self.engine, &mut linker)?;

        let instance = linker
            .instantiate(&mut store, &module.module)
            .map_err(|e| match e.downcast_ref::<Trap>() {
                Some(trap) => HarnessError::Trap(trap.to_string()),
                None => HarnessError::Link(format!("{e:#}")),
            })?;

        debug!(imports = imports.len(), "Module instantiated");
        Ok(ModuleInstance::new(store, instance, module.clone()))
    }

    /// Run a full check: load, compile, instantiate, resolve, call, verify.
    ///
    /// # Errors
    ///
    /// The first failing step's error. A wrong result is
    /// [`HarnessError::Mismatch`].
    pub fn run_check(&self, spec: &CheckSpec) -> HarnessResult<CheckReport> {
        crate::check::run(self, spec)
    }
}

impl std::fmt::Debug for ModuleHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleHarness")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
