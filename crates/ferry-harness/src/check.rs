//! One-shot "load, call, verify" flow.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::error::{HarnessError, HarnessResult};
use crate::harness::ModuleHarness;
use crate::imports::ImportSet;
use crate::number::Number;
use crate::verify;

/// Where the module comes from.
#[derive(Debug, Clone)]
pub enum ModuleSource {
    /// A `.wasm` file.
    File(PathBuf),
    /// Bytes already in memory.
    Bytes(Vec<u8>),
}

/// What to call and what to expect.
///
/// Arguments and the expectation are text, parsed against the export's
/// parameter and result types once the export is resolved.
#[derive(Debug, Clone)]
pub struct CheckSpec {
    /// Module to load.
    pub source: ModuleSource,
    /// Export to call.
    pub export: String,
    /// Arguments, one per parameter.
    pub args: Vec<String>,
    /// Expected result; `None` skips verification.
    pub expected: Option<String>,
}

impl CheckSpec {
    /// Call `export` of `source` with no arguments and no expectation.
    #[must_use]
    pub fn new(source: ModuleSource, export: impl Into<String>) -> Self {
        Self {
            source,
            export: export.into(),
            args: Vec::new(),
            expected: None,
        }
    }

    /// `add(5, 3) == 8`, the canonical smoke check.
    #[must_use]
    pub fn add_smoke(source: ModuleSource) -> Self {
        Self::new(source, "add")
            .with_args(["5", "3"])
            .expecting("8")
    }

    /// Set the arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the expected result.
    #[must_use]
    pub fn expecting(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

/// Outcome of a successful check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Export that was called.
    pub export: String,
    /// Content hash of the module.
    pub module_hash: String,
    /// Parsed arguments.
    pub args: Vec<Number>,
    /// Returned value.
    pub result: Number,
    /// Whether the result was compared with an expectation.
    pub verified: bool,
}

pub(crate) fn run(harness: &ModuleHarness, spec: &CheckSpec) -> HarnessResult<CheckReport> {
    let module = match &spec.source {
        ModuleSource::File(path) => harness.load(path)?,
        ModuleSource::Bytes(bytes) => harness.compile(bytes)?,
    };
    info!(hash = %module.hash(), "Loaded module");

    let mut instance = harness.instantiate(&module, &ImportSet::empty())?;
    info!("Instantiated module");

    let export = instance.resolve_export(&spec.export)?;
    info!(export = export.name(), "Resolved export");

    if spec.args.len() != export.params().len() {
        return Err(HarnessError::Signature {
            export: spec.export.clone(),
            message: format!(
                "expected {} argument(s), got {}",
                export.params().len(),
                spec.args.len()
            ),
        });
    }
    let args = spec
        .args
        .iter()
        .zip(export.params())
        .map(|(text, kind)| {
            Number::parse_as(text, *kind).map_err(|e| HarnessError::Signature {
                export: spec.export.clone(),
                message: e.to_string(),
            })
        })
        .collect::<HarnessResult<Vec<_>>>()?;

    let result = instance.call(&export, &args)?;
    info!(export = export.name(), %result, "Called export");

    let verified = match &spec.expected {
        Some(text) => {
            let expected = Number::parse_as(text, result.kind()).map_err(|e| {
                HarnessError::Signature {
                    export: spec.export.clone(),
                    message: format!("expected value: {e}"),
                }
            })?;
            verify(result, expected)?;
            info!(%expected, "Result verified");
            true
        },
        None => false,
    };

    Ok(CheckReport {
        export: spec.export.clone(),
        module_hash: module.hash(),
        args,
        result,
        verified,
    })
}
