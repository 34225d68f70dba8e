//! Commands that load WebAssembly modules: `verify`, `inspect` and `plugin`.
//!
//! These are standalone harness flows. Any failure is fatal and surfaces
//! through `main` as a non-zero exit.

use std::path::Path;

use anyhow::{Context as _, Result};
use colored::Colorize;
use ferry_config::Config;
use ferry_harness::{CheckSpec, ModuleHarness, ModuleSource, PluginRunner, inspect};
use tracing::info;

use crate::config_bridge;
use crate::output::{self, OutputFormat};
use crate::theme::Theme;

/// Export checked when `verify` gets no explicit arguments.
const SMOKE_EXPORT: &str = "add";

/// Build the check for `ferry verify`.
///
/// With the default export and no arguments this is the `add(5, 3) == 8`
/// smoke check; an explicit `--expect` still overrides its expectation.
pub(crate) fn check_spec(
    module: &Path,
    export: &str,
    args: Option<Vec<String>>,
    expect: Option<String>,
) -> CheckSpec {
    let source = ModuleSource::File(module.to_path_buf());
    let mut spec = match args {
        None if export == SMOKE_EXPORT => CheckSpec::add_smoke(source),
        args => CheckSpec::new(source, export).with_args(args.unwrap_or_default()),
    };
    if let Some(expected) = expect {
        spec = spec.expecting(expected);
    }
    spec
}

/// `ferry verify`
pub(crate) fn verify(cfg: &Config, format: OutputFormat, spec: &CheckSpec) -> Result<()> {
    let harness = ModuleHarness::new(config_bridge::to_harness_config(cfg))
        .context("failed to create module harness")?;
    let report = harness
        .run_check(spec)
        .with_context(|| format!("check of `{}` failed", spec.export))?;

    if format == OutputFormat::Json {
        return output::print_json(&report);
    }

    let args: Vec<String> = report.args.iter().map(ToString::to_string).collect();
    let call = format!("{}({}) = {}", report.export, args.join(", "), report.result);
    if report.verified {
        println!("{}", Theme::success(&format!("{call} (verified)")));
    } else {
        println!("{}", Theme::info(&call));
    }
    println!("  {}", Theme::dimmed(&format!("module {}", report.module_hash)));
    Ok(())
}

/// `ferry inspect`
pub(crate) fn inspect_module(cfg: &Config, format: OutputFormat, module: &Path) -> Result<()> {
    let bytes = std::fs::read(module)
        .with_context(|| format!("failed to read module {}", module.display()))?;
    let listing = inspect(&bytes)?;

    let harness = ModuleHarness::new(config_bridge::to_harness_config(cfg))
        .context("failed to create module harness")?;
    let compiled = harness.compile(&bytes)?;
    info!(hash = %compiled.hash(), "Module compiled");

    if format == OutputFormat::Json {
        return output::print_json(&serde_json::json!({
            "module": module.display().to_string(),
            "hash": compiled.hash(),
            "imports": listing.imports,
            "exports": listing.exports,
        }));
    }

    println!("{}", Theme::header(&module.display().to_string()));
    println!("  {}", Theme::dimmed(&compiled.hash()));
    println!("{}", Theme::separator());

    println!("{}", "Imports:".cyan());
    if listing.imports.is_empty() {
        println!("  {}", Theme::dimmed("none"));
    }
    for import in &listing.imports {
        println!("  {:<7} {}.{}", import.kind, import.module, import.name);
    }

    println!("{}", "Exports:".cyan());
    if listing.exports.is_empty() {
        println!("  {}", Theme::dimmed("none"));
    }
    for export in &listing.exports {
        println!("  {:<7} {}", export.kind, export.name);
    }
    Ok(())
}

/// `ferry plugin`
pub(crate) fn plugin(
    cfg: &Config,
    format: OutputFormat,
    module: &Path,
    function: &str,
    input: &str,
    expect: Option<&str>,
) -> Result<()> {
    let timeout = config_bridge::to_harness_config(cfg).plugin_timeout;
    let mut runner = PluginRunner::load_file(module, timeout)?;

    let output = match expect {
        Some(expected) => runner.expect(function, input, expected)?,
        None => runner.call(function, input)?,
    };

    if format == OutputFormat::Json {
        return output::print_json(&serde_json::json!({
            "function": function,
            "input": input,
            "output": output,
            "verified": expect.is_some(),
        }));
    }

    if expect.is_some() {
        println!("{}", Theme::success(&format!("{function}({input:?}) = {output:?} (verified)")));
    } else {
        println!("{output}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_verify_is_add_smoke() {
        let spec = check_spec(Path::new("m.wasm"), "add", None, None);
        assert_eq!(spec.export, "add");
        assert_eq!(spec.args, vec!["5", "3"]);
        assert_eq!(spec.expected.as_deref(), Some("8"));
    }

    #[test]
    fn test_explicit_expect_overrides_smoke() {
        let spec = check_spec(Path::new("m.wasm"), "add", None, Some("9".to_owned()));
        assert_eq!(spec.expected.as_deref(), Some("9"));
    }

    #[test]
    fn test_other_export_has_no_default_args() {
        let spec = check_spec(Path::new("m.wasm"), "spin", None, None);
        assert!(spec.args.is_empty());
        assert!(spec.expected.is_none());

        let spec = check_spec(
            Path::new("m.wasm"),
            "add",
            Some(vec!["1".to_owned(), "2".to_owned()]),
            None,
        );
        assert_eq!(spec.args, vec!["1", "2"]);
        assert!(spec.expected.is_none());
    }

    #[test]
    fn test_verify_reports_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("add.wasm");
        std::fs::write(&path, ferry_test::fixtures::add_module()).unwrap();

        let cfg = Config::default();
        let ok = check_spec(&path, "add", None, None);
        verify(&cfg, OutputFormat::Json, &ok).unwrap();

        let wrong = check_spec(&path, "add", None, Some("9".to_owned()));
        let err = verify(&cfg, OutputFormat::Json, &wrong).unwrap_err();
        assert!(format!("{err:#}").contains("verification failed"));
    }

    #[test]
    fn test_inspect_rejects_truncated_module() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.wasm");
        std::fs::write(&path, ferry_test::fixtures::truncated_module()).unwrap();

        assert!(inspect_module(&Config::default(), OutputFormat::Json, &path).is_err());
    }
}
