//! `transformData(inputJSON[, guestSource])`.

use std::sync::Arc;

use ferry_core::{Clock, DocumentValue, HostValue, decode, encode, iso_timestamp};
use ferry_guest::GuestEngine;
use serde_json::json;
use tracing::debug;

use crate::error::{BridgeError, BridgeResult};
use crate::operation::{Contract, Operation, Param};

const NAME: &str = "transformData";

/// Decode input, transform it (built-in or guest script), encode the result.
pub struct TransformData {
    engine: GuestEngine,
    clock: Arc<dyn Clock>,
    message: String,
}

impl TransformData {
    /// Create the operation.
    pub fn new(engine: GuestEngine, clock: Arc<dyn Clock>, message: impl Into<String>) -> Self {
        Self {
            engine,
            clock,
            message: message.into(),
        }
    }

    /// Wrap the input with `transformed`, `timestamp` and `message`.
    fn builtin(&self, original: DocumentValue) -> DocumentValue {
        json!({
            "original": original,
            "transformed": true,
            "timestamp": iso_timestamp(self.clock.now()),
            "message": self.message,
        })
    }
}

impl Operation for TransformData {
    fn name(&self) -> &'static str {
        NAME
    }

    fn contract(&self) -> Contract {
        Contract::new(
            "Transform a JSON document with the built-in transformation or a guest script",
            vec![
                Param::required("inputJSON", "JSON text to transform"),
                Param::optional(
                    "guestSource",
                    "JavaScript defining the entry function; omit for the built-in transformation",
                ),
            ],
        )
    }

    fn call(&self, args: &[HostValue]) -> BridgeResult<String> {
        let input = HostValue::nth(args, 0);
        let text = input.as_str().ok_or_else(|| {
            BridgeError::argument(
                NAME,
                format!("inputJSON must be a string, got {}", input.type_name()),
            )
        })?;
        let document = decode(text)?;

        let output = match HostValue::nth(args, 1) {
            source if source.is_nullish() => self.builtin(document),
            HostValue::String(source) => {
                debug!(source_len = source.len(), "Running guest transformation");
                self.engine.transform(source, &document)?
            },
            other => {
                return Err(BridgeError::argument(
                    NAME,
                    format!("guestSource must be a string, got {}", other.type_name()),
                ));
            },
        };

        Ok(encode(&output)?)
    }
}

#[cfg(test)]
mod tests {
    use ferry_test::{FixedClock, clock::STANDARD_TIMESTAMP, scripts};

    use super::*;

    fn operation() -> TransformData {
        TransformData::new(
            GuestEngine::default(),
            Arc::new(FixedClock::standard()),
            "processed",
        )
    }

    #[test]
    fn test_builtin_transformation() {
        let out = operation().call(&[HostValue::from(r#"{"a":1}"#)]).unwrap();
        assert_eq!(
            out,
            format!(
                r#"{{"original":{{"a":1}},"transformed":true,"timestamp":"{STANDARD_TIMESTAMP}","message":"processed"}}"#
            )
        );
    }

    #[test]
    fn test_null_source_selects_builtin() {
        let out = operation()
            .call(&[HostValue::from("[1,2]"), HostValue::Null])
            .unwrap();
        let doc = decode(&out).unwrap();
        assert_eq!(doc["original"], json!([1, 2]));
        assert_eq!(doc["transformed"], json!(true));
    }

    #[test]
    fn test_guest_transformation() {
        let out = operation()
            .call(&[
                HostValue::from(r#"{"n":5}"#),
                HostValue::from(scripts::DOUBLED_TRANSFORM),
            ])
            .unwrap();
        assert_eq!(decode(&out).unwrap(), json!({"n": 5, "doubled": true}));
    }

    #[test]
    fn test_malformed_input() {
        let err = operation()
            .call(&[HostValue::from("invalid json {")])
            .unwrap_err();
        assert_eq!(err.kind(), "ParseError");
        assert!(err.to_string().starts_with("failed to parse input JSON"));
    }

    #[test]
    fn test_wrong_argument_types() {
        let err = operation().call(&[HostValue::Number(3.0)]).unwrap_err();
        assert_eq!(err.to_string(), "transformData: inputJSON must be a string, got number");

        let err = operation()
            .call(&[HostValue::from("{}"), HostValue::Bool(true)])
            .unwrap_err();
        assert_eq!(err.kind(), "ArgumentError");
    }

    #[test]
    fn test_guest_failures_surface() {
        let op = operation();
        let input = HostValue::from("{}");

        let err = op
            .call(&[input.clone(), HostValue::from(scripts::BROKEN_SYNTAX)])
            .unwrap_err();
        assert_eq!(err.kind(), "GuestSyntaxError");

        let err = op
            .call(&[input.clone(), HostValue::from(scripts::THROWS_AT_LOAD)])
            .unwrap_err();
        assert_eq!(err.kind(), "GuestRuntimeError");
        assert!(err.to_string().contains("load failed"));

        let err = op
            .call(&[input.clone(), HostValue::from(scripts::MISSING_ENTRY)])
            .unwrap_err();
        assert_eq!(err.to_string(), "transform function not found in JavaScript code");

        let err = op
            .call(&[input, HostValue::from(scripts::THROWS_ON_CALL)])
            .unwrap_err();
        assert_eq!(err.kind(), "GuestInvocationError");
        assert!(err.to_string().contains("RangeError: no thanks"));
    }
}
