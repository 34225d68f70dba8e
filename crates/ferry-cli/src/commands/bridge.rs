//! Commands that go through the host bridge: `transform`, `health`, `eval`
//! and `ops`.

use std::io::Read as _;
use std::path::Path;

use anyhow::{Context as _, Result};
use colored::Colorize;
use ferry_bridge::{Bridge, builtin};
use ferry_config::Config;
use ferry_core::HostValue;

use crate::config_bridge;
use crate::output::{self, OutputFormat};
use crate::theme::Theme;

/// Build a bridge over the default registry.
pub(crate) fn build_bridge(cfg: &Config) -> Result<Bridge> {
    let registry = builtin::default_registry(config_bridge::to_builtin_settings(cfg))
        .context("failed to register built-in operations")?;
    Ok(Bridge::new(registry))
}

async fn invoke_and_print(
    bridge: &Bridge,
    format: OutputFormat,
    operation: &str,
    args: Vec<HostValue>,
) {
    let outcome = bridge.invoke(operation, args).await;
    output::print_outcome(format, operation, &outcome);
}

/// `ferry transform`
pub(crate) async fn transform(
    bridge: &Bridge,
    format: OutputFormat,
    input: Option<String>,
    input_file: Option<&Path>,
    script: Option<&Path>,
) -> Result<()> {
    let input = match (input, input_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?,
        (None, None) => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read input JSON from stdin")?;
            text
        },
    };

    let mut args = vec![HostValue::String(input)];
    if let Some(path) = script {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        args.push(HostValue::String(source));
    }

    invoke_and_print(bridge, format, "transformData", args).await;
    Ok(())
}

/// `ferry health`
pub(crate) async fn health(bridge: &Bridge, format: OutputFormat) {
    invoke_and_print(bridge, format, "healthCheck", Vec::new()).await;
}

/// `ferry eval`
pub(crate) async fn eval(bridge: &Bridge, format: OutputFormat, code: String, input: String) {
    let args = vec![HostValue::String(code), HostValue::String(input)];
    invoke_and_print(bridge, format, "evaluateScript", args).await;
}

/// `ferry ops`
pub(crate) fn list_operations(bridge: &Bridge, format: OutputFormat) -> Result<()> {
    let operations = bridge.operations();

    if format == OutputFormat::Json {
        return output::print_json(&operations);
    }

    println!("{}", Theme::header("Exposed operations"));
    println!("{}", Theme::separator());
    for info in &operations {
        println!(
            "  {}  {}",
            info.contract.signature(info.name).bold(),
            Theme::dimmed(info.contract.summary)
        );
        for param in &info.contract.params {
            let marker = if param.required { "" } else { " (optional)" };
            println!("      {}{marker}: {}", param.name, param.description);
        }
    }
    Ok(())
}
