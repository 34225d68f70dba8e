//! A live module instance and calls into its exports.

use tracing::debug;
use wasmtime::{Func, Instance, Store, Trap, Val};

use crate::error::{HarnessError, HarnessResult};
use crate::harness::CompiledModule;
use crate::number::{Number, NumberKind};

/// An exported function resolved by name, with its numeric signature.
#[derive(Debug, Clone)]
pub struct ExportedFunc {
    name: String,
    func: Func,
    params: Vec<NumberKind>,
    results: Vec<NumberKind>,
}

impl ExportedFunc {
    /// Export name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter kinds.
    #[must_use]
    pub fn params(&self) -> &[NumberKind] {
        &self.params
    }

    /// Result kinds.
    #[must_use]
    pub fn results(&self) -> &[NumberKind] {
        &self.results
    }

    fn signature_error(&self, message: impl Into<String>) -> HarnessError {
        HarnessError::Signature {
            export: self.name.clone(),
            message: message.into(),
        }
    }
}

/// An instantiated module with its own store.
///
/// Holds the compiled module, so the code outlives every call made here.
pub struct ModuleInstance {
    store: Store<()>,
    instance: Instance,
    module: CompiledModule,
}

impl ModuleInstance {
    pub(crate) fn new(store: Store<()>, instance: Instance, module: CompiledModule) -> Self {
        Self {
            store,
            instance,
            module,
        }
    }

    /// The module this instance was created from.
    #[must_use]
    pub fn module(&self) -> &CompiledModule {
        &self.module
    }

    /// Fuel left, when metering is on.
    #[must_use]
    pub fn remaining_fuel(&self) -> Option<u64> {
        self.store.get_fuel().ok()
    }

    /// Look up a function export.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::ExportNotFound`] if there is no function export with
    ///   this name
    /// - [`HarnessError::Signature`] if it takes or returns non-numeric values
    pub fn resolve_export(&mut self, name: &str) -> HarnessResult<ExportedFunc> {
        let func = self
            .instance
            .get_func(&mut self.store, name)
            .ok_or_else(|| HarnessError::ExportNotFound {
                name: name.to_string(),
                available: self.module.function_exports(),
            })?;

        let ty = func.ty(&self.store);
        let unsupported = || HarnessError::Signature {
            export: name.to_string(),
            message: "only numeric parameters and results are supported".to_string(),
        };
        let params = ty
            .params()
            .map(|t| NumberKind::from_val_type(&t))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(unsupported)?;
        let results = ty
            .results()
            .map(|t| NumberKind::from_val_type(&t))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(unsupported)?;

        debug!(export = name, ?params, ?results, "Resolved export");
        Ok(ExportedFunc {
            name: name.to_string(),
            func,
            params,
            results,
        })
    }

    /// Call an export that returns exactly one value.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::Signature`] if the arguments do not match, or the
    ///   export does not return exactly one value
    /// - [`HarnessError::Trap`] if the module traps or runs out of fuel
    /// - [`HarnessError::Call`] for any other failure
    pub fn call(&mut self, export: &ExportedFunc, args: &[Number]) -> HarnessResult<Number> {
        if export.results.len() != 1 {
            return Err(export.signature_error(format!(
                "expected a single result, export returns {}",
                export.results.len()
            )));
        }
        let mut values = self.call_values(export, args)?;
        values
            .pop()
            .ok_or_else(|| HarnessError::Call("export returned no value".to_string()))
    }

    /// Call an export and return all of its results.
    ///
    /// # Errors
    ///
    /// As [`call`](Self::call), without the single-result requirement.
    pub fn call_values(
        &mut self,
        export: &ExportedFunc,
        args: &[Number],
    ) -> HarnessResult<Vec<Number>> {
        if args.len() != export.params.len() {
            return Err(export.signature_error(format!(
                "expected {} argument(s), got {}",
                export.params.len(),
                args.len()
            )));
        }
        for (position, (arg, kind)) in args.iter().zip(&export.params).enumerate() {
            if arg.kind() != *kind {
                return Err(export.signature_error(format!(
                    "argument {} must be {kind}, got {}",
                    position.saturating_add(1),
                    arg.kind()
                )));
            }
        }

        let params: Vec<Val> = args.iter().map(|a| a.to_val()).collect();
        let mut results: Vec<Val> = export.results.iter().map(|k| k.zero().to_val()).collect();

        export
            .func
            .call(&mut self.store, &params, &mut results)
            .map_err(|e| match e.downcast_ref::<Trap>() {
                Some(trap) => HarnessError::Trap(trap.to_string()),
                None => HarnessError::Call(format!("{e:#}")),
            })?;

        results
            .iter()
            .map(|v| {
                Number::from_val(v)
                    .ok_or_else(|| HarnessError::Call("export returned a non-numeric value".into()))
            })
            .collect()
    }
}

impl std::fmt::Debug for ModuleInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleInstance")
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ferry_test::fixtures;

    use super::*;
    use crate::harness::{HarnessConfig, ModuleHarness};
    use crate::imports::ImportSet;

    fn instance_of(bytes: &[u8]) -> ModuleInstance {
        let harness = ModuleHarness::with_defaults().unwrap();
        let module = harness.compile(bytes).unwrap();
        harness.instantiate(&module, &ImportSet::empty()).unwrap()
    }

    #[test]
    fn add_five_and_three() {
        let mut instance = instance_of(&fixtures::add_module());
        let add = instance.resolve_export("add").unwrap();
        assert_eq!(add.params(), [NumberKind::I32, NumberKind::I32]);
        assert_eq!(add.results(), [NumberKind::I32]);
        let sum = instance.call(&add, &[Number::I32(5), Number::I32(3)]).unwrap();
        assert_eq!(sum, Number::I32(8));
    }

    #[test]
    fn add_wraps_on_overflow() {
        let mut instance = instance_of(&fixtures::add_module());
        let add = instance.resolve_export("add").unwrap();
        let sum = instance
            .call(&add, &[Number::I32(i32::MAX), Number::I32(1)])
            .unwrap();
        assert_eq!(sum, Number::I32(i32::MIN));
    }

    #[test]
    fn missing_export() {
        let mut instance = instance_of(&fixtures::module_without_add());
        let err = instance.resolve_export("add").unwrap_err();
        match err {
            HarnessError::ExportNotFound { name, available } => {
                assert_eq!(name, "add");
                assert_eq!(available, ["sub"]);
            },
            other => panic!("expected ExportNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn argument_checks() {
        let mut instance = instance_of(&fixtures::add_module());
        let add = instance.resolve_export("add").unwrap();

        let err = instance.call(&add, &[Number::I32(5)]).unwrap_err();
        assert_eq!(err.to_string(), "cannot call `add`: expected 2 argument(s), got 1");

        let err = instance
            .call(&add, &[Number::I32(5), Number::F64(3.0)])
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot call `add`: argument 2 must be i32, got f64");
    }

    #[test]
    fn wide_and_float_exports() {
        let mut instance = instance_of(&fixtures::numeric_module());
        let wide = instance.resolve_export("wide").unwrap();
        let out = instance
            .call(&wide, &[Number::I64(1_099_511_627_776), Number::I64(2)])
            .unwrap();
        assert_eq!(out, Number::I64(1_099_511_627_778));

        let scale = instance.resolve_export("scale").unwrap();
        let out = instance
            .call(&scale, &[Number::F64(1.5), Number::F64(4.0)])
            .unwrap();
        assert_eq!(out, Number::F64(6.0));
    }

    #[test]
    fn traps_are_reported() {
        let mut instance = instance_of(&fixtures::trapping_module());
        let boom = instance.resolve_export("boom").unwrap();
        let err = instance.call(&boom, &[]).unwrap_err();
        assert!(matches!(err, HarnessError::Trap(_)), "got: {err:?}");
    }

    #[test]
    fn fuel_exhaustion_traps() {
        let harness = ModuleHarness::new(HarnessConfig::default().with_fuel(10_000)).unwrap();
        let module = harness.compile(&fixtures::looping_module()).unwrap();
        let mut instance = harness.instantiate(&module, &ImportSet::empty()).unwrap();
        assert_eq!(instance.remaining_fuel(), Some(10_000));

        let spin = instance.resolve_export("spin").unwrap();
        let err = instance.call_values(&spin, &[]).unwrap_err();
        assert!(matches!(err, HarnessError::Trap(_)), "got: {err:?}");
        assert!(instance.remaining_fuel().unwrap_or_default() < 10_000);
    }

    #[test]
    fn void_export_needs_call_values() {
        let harness = ModuleHarness::new(HarnessConfig::default().with_fuel(10)).unwrap();
        let module = harness.compile(&fixtures::looping_module()).unwrap();
        let mut instance = harness.instantiate(&module, &ImportSet::empty()).unwrap();
        let spin = instance.resolve_export("spin").unwrap();
        let err = instance.call(&spin, &[]).unwrap_err();
        assert_eq!(err.kind(), "SignatureError");
    }

    #[test]
    fn host_imports_are_called() {
        let harness = ModuleHarness::with_defaults().unwrap();
        let module = harness.compile(&fixtures::importing_module()).unwrap();
        let imports = ImportSet::empty().with_func(
            "env",
            "double",
            &[NumberKind::I32],
            &[NumberKind::I32],
            |args| match args {
                [Number::I32(v)] => Ok(vec![Number::I32(v.wrapping_mul(2))]),
                _ => Err("bad arguments".to_string()),
            },
        );
        let mut instance = harness.instantiate(&module, &imports).unwrap();
        let apply = instance.resolve_export("apply").unwrap();
        assert_eq!(instance.call(&apply, &[Number::I32(21)]).unwrap(), Number::I32(42));
    }

    #[test]
    fn failing_host_import_surfaces() {
        let harness = ModuleHarness::with_defaults().unwrap();
        let module = harness.compile(&fixtures::importing_module()).unwrap();
        let imports = ImportSet::empty().with_func(
            "env",
            "double",
            &[NumberKind::I32],
            &[NumberKind::I32],
            |_| Err("host refused".to_string()),
        );
        let mut instance = harness.instantiate(&module, &imports).unwrap();
        let apply = instance.resolve_export("apply").unwrap();
        let err = instance.call(&apply, &[Number::I32(1)]).unwrap_err();
        assert!(err.to_string().contains("host refused"), "{err}");
    }
}
