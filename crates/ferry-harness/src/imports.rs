//! Host functions offered to a module at instantiation.

use std::fmt;
use std::sync::Arc;

use wasmtime::{Engine, FuncType, Linker, Val};

use crate::error::{HarnessError, HarnessResult};
use crate::number::{Number, NumberKind};

/// Body of a host function: typed arguments in, typed results out. An `Err`
/// traps the calling module with that message.
pub type HostFn = dyn Fn(&[Number]) -> Result<Vec<Number>, String> + Send + Sync;

struct HostImport {
    module: String,
    name: String,
    params: Vec<NumberKind>,
    results: Vec<NumberKind>,
    func: Arc<HostFn>,
}

/// Host functions a module may import.
///
/// [`ImportSet::empty`] is valid for modules without imports.
#[derive(Default)]
pub struct ImportSet {
    imports: Vec<HostImport>,
}

impl ImportSet {
    /// No imports.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Provide `module.name` with the given signature.
    #[must_use]
    pub fn with_func<F>(
        mut self,
        module: impl Into<String>,
        name: impl Into<String>,
        params: &[NumberKind],
        results: &[NumberKind],
        func: F,
    ) -> Self
    where
        F: Fn(&[Number]) -> Result<Vec<Number>, String> + Send + Sync + 'static,
    {
        self.imports.push(HostImport {
            module: module.into(),
            name: name.into(),
            params: params.to_vec(),
            results: results.to_vec(),
            func: Arc::new(func),
        });
        self
    }

    /// Number of provided functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.imports.len()
    }

    /// Whether no functions are provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Register every function with `linker`.
    pub(crate) fn define(&self, engine: &Engine, linker: &mut Linker<()>) -> HarnessResult<()> {
        for import in &self.imports {
            let ty = FuncType::new(
                engine,
                import.params.iter().map(|k| k.val_type()),
                import.results.iter().map(|k| k.val_type()),
            );
            let func = Arc::clone(&import.func);
            let qualified = format!("{}.{}", import.module, import.name);
            let expected_results = import.results.clone();

            linker
                .func_new(&import.module, &import.name, ty, move |_caller, params, results| {
                    let args: Vec<Number> = params.iter().filter_map(Number::from_val).collect();
                    let values = func(&args).map_err(wasmtime::Error::msg)?;
                    write_results(&qualified, &expected_results, &values, results)
                })
                .map_err(|e| HarnessError::Link(e.to_string()))?;
        }
        Ok(())
    }
}

fn write_results(
    qualified: &str,
    expected: &[NumberKind],
    values: &[Number],
    results: &mut [Val],
) -> wasmtime::Result<()> {
    if values.len() != expected.len()
        || values.iter().zip(expected).any(|(v, k)| v.kind() != *k)
    {
        return Err(wasmtime::Error::msg(format!(
            "host function {qualified} returned values that do not match its signature"
        )));
    }
    for (slot, value) in results.iter_mut().zip(values) {
        *slot = value.to_val();
    }
    Ok(())
}

impl fmt::Debug for ImportSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.imports
                    .iter()
                    .map(|i| format!("{}.{}", i.module, i.name)),
            )
            .finish()
    }
}
