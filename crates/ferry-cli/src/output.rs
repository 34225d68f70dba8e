//! Rendering of command results for `--format pretty|json`.

use std::str::FromStr;

use ferry_bridge::{BridgeError, BridgeResult};
use serde::Serialize;
use serde_json::{Value, json};

use crate::theme::Theme;

/// Output format mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Pretty,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}'; expected pretty or json")),
        }
    }
}

/// Machine-readable form of an invocation outcome.
pub(crate) fn outcome_json(operation: &str, outcome: &BridgeResult<String>) -> Value {
    match outcome {
        Ok(text) => json!({
            "operation": operation,
            "status": "fulfilled",
            "value": parse_or_text(text),
        }),
        Err(e) => json!({
            "operation": operation,
            "status": "rejected",
            "kind": e.kind(),
            "message": e.to_string(),
        }),
    }
}

/// Operation results are JSON text; show them structured when they parse.
fn parse_or_text(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

/// Print an invocation outcome.
///
/// Rejections are results of the call, not failures of the CLI; they are
/// printed to stderr in pretty mode and inline in JSON mode.
pub(crate) fn print_outcome(format: OutputFormat, operation: &str, outcome: &BridgeResult<String>) {
    match format {
        OutputFormat::Json => println!("{}", outcome_json(operation, outcome)),
        OutputFormat::Pretty => match outcome {
            Ok(text) => {
                let rendered = serde_json::from_str::<Value>(text)
                    .ok()
                    .and_then(|v| serde_json::to_string_pretty(&v).ok())
                    .unwrap_or_else(|| text.clone());
                println!("{rendered}");
            },
            Err(e) => eprintln!("{}", rejection_line(e)),
        },
    }
}

fn rejection_line(error: &BridgeError) -> String {
    format!(
        "{} {}",
        Theme::error(&error.to_string()),
        Theme::dimmed(&format!("({})", error.kind()))
    )
}

/// Print any serializable report as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
