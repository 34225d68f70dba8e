//! `evaluateScript(jsCode, inputData)`.

use ferry_core::HostValue;
use ferry_guest::GuestEngine;

use crate::error::{BridgeError, BridgeResult};
use crate::operation::{Contract, Operation, Param};

const NAME: &str = "evaluateScript";

/// Evaluates a script with the raw input text bound to `inputData` and
/// returns the completion value as text.
pub struct EvaluateScript {
    engine: GuestEngine,
}

impl EvaluateScript {
    /// Create the operation.
    pub fn new(engine: GuestEngine) -> Self {
        Self { engine }
    }
}

impl Operation for EvaluateScript {
    fn name(&self) -> &'static str {
        NAME
    }

    fn contract(&self) -> Contract {
        Contract::new(
            "Evaluate JavaScript with inputData bound and return its completion value",
            vec![
                Param::required("jsCode", "JavaScript source"),
                Param::required("inputData", "Text bound to the global inputData"),
            ],
        )
    }

    fn call(&self, args: &[HostValue]) -> BridgeResult<String> {
        let code = HostValue::nth(args, 0);
        let code = code.as_str().ok_or_else(|| {
            BridgeError::argument(
                NAME,
                format!("jsCode must be a string, got {}", code.type_name()),
            )
        })?;
        // Non-string input is coerced the way the host's `String(x)` does.
        let input = HostValue::nth(args, 1).to_string();

        Ok(self.engine.evaluate(code, &input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_with_input() {
        let op = EvaluateScript::new(GuestEngine::default());
        let out = op
            .call(&[
                HostValue::from("JSON.parse(inputData).items.length"),
                HostValue::from(r#"{"items":[1,2,3]}"#),
            ])
            .unwrap();
        assert_eq!(out, "3");
    }

    #[test]
    fn test_number_input_is_coerced() {
        let op = EvaluateScript::new(GuestEngine::default());
        let out = op
            .call(&[HostValue::from("inputData + '!'"), HostValue::Number(7.0)])
            .unwrap();
        assert_eq!(out, "7!");
    }

    #[test]
    fn test_code_must_be_string() {
        let op = EvaluateScript::new(GuestEngine::default());
        let err = op.call(&[HostValue::Null, HostValue::from("")]).unwrap_err();
        assert_eq!(err.kind(), "ArgumentError");
    }
}
