//! End-to-end tests of the host bridge: built-in operations, guest scripts,
//! error classes, concurrency and fault isolation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ferry_bridge::builtin::{self, BuiltinSettings, HealthCheck, TransformData};
use ferry_bridge::{
    Bridge, BridgeError, BridgeResult, Contract, DeferredState, Operation, OperationRegistry,
};
use ferry_core::{HostValue, decode};
use ferry_guest::{GuestConfig, GuestEngine};
use ferry_test::clock::STANDARD_TIMESTAMP;
use ferry_test::{FixedClock, scripts};
use futures::future::join_all;
use serde_json::json;

fn settings() -> BuiltinSettings {
    BuiltinSettings {
        clock: Arc::new(FixedClock::standard()),
        ..BuiltinSettings::default()
    }
}

fn default_bridge() -> Bridge {
    Bridge::new(builtin::default_registry(settings()).unwrap())
}

fn text(s: &str) -> HostValue {
    HostValue::from(s)
}

#[tokio::test]
async fn builtin_transformation_wraps_input() {
    let bridge = default_bridge();

    let out = bridge
        .invoke("transformData", vec![text(r#"{"a":1}"#)])
        .await
        .unwrap();

    assert_eq!(
        decode(&out).unwrap(),
        json!({
            "original": {"a": 1},
            "transformed": true,
            "timestamp": STANDARD_TIMESTAMP,
            "message": builtin::DEFAULT_TRANSFORM_MESSAGE,
        })
    );
}

#[tokio::test]
async fn guest_transformation_runs_script() {
    let bridge = default_bridge();

    let out = bridge
        .invoke(
            "transformData",
            vec![text(r#"{"n":5}"#), text(scripts::DOUBLED_TRANSFORM)],
        )
        .await
        .unwrap();

    assert_eq!(out, r#"{"n":5,"doubled":true}"#);
}

#[tokio::test]
async fn proto_member_survives_identity_script() {
    let bridge = default_bridge();
    let input = r#"{"__proto__":{"admin":true},"b":2}"#;

    let echoed = bridge
        .invoke(
            "transformData",
            vec![text(input), text("function transform(x) { return x; }")],
        )
        .await
        .unwrap();
    assert_eq!(echoed, input);

    let seen = bridge
        .invoke(
            "transformData",
            vec![
                text(input),
                text("function transform(x) { return { own: Object.keys(x), admin: x.admin === true }; }"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(seen, r#"{"own":["__proto__","b"],"admin":false}"#);
}

#[tokio::test]
async fn error_classes_reach_the_caller() {
    let bridge = default_bridge();
    let with_script = |source: &str| vec![text("{}"), text(source)];

    let cases = [
        (with_script(scripts::BROKEN_SYNTAX), "GuestSyntaxError"),
        (with_script(scripts::THROWS_AT_LOAD), "GuestRuntimeError"),
        (with_script(scripts::MISSING_ENTRY), "GuestLookupError"),
        (with_script(scripts::THROWS_ON_CALL), "GuestInvocationError"),
        (vec![text("invalid json {")], "ParseError"),
        (vec![HostValue::Number(1.0)], "ArgumentError"),
    ];

    for (args, expected_kind) in cases {
        let err = bridge.invoke("transformData", args).await.unwrap_err();
        assert_eq!(err.kind(), expected_kind, "unexpected class for: {err}");
    }

    let err = bridge
        .invoke("transformData", with_script(scripts::MISSING_ENTRY))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "transform function not found in JavaScript code"
    );
}

#[tokio::test]
async fn zero_arguments_is_an_argument_error() {
    let bridge = default_bridge();

    let err = bridge.invoke("transformData", Vec::new()).await.unwrap_err();

    match &err {
        BridgeError::Argument { operation, message } => {
            assert_eq!(operation, "transformData");
            assert!(message.contains("expected at least 1 argument"), "{message}");
            assert!(message.contains("inputJSON"), "{message}");
        },
        other => panic!("expected Argument, got: {other:?}"),
    }
}

#[tokio::test]
async fn health_check_is_always_healthy() {
    let bridge = default_bridge();

    let out = bridge
        .invoke("healthCheck", vec![text("ignored")])
        .await
        .unwrap();

    assert_eq!(
        decode(&out).unwrap(),
        json!({"status": "healthy", "message": builtin::DEFAULT_HEALTH_MESSAGE})
    );
}

#[tokio::test]
async fn evaluate_script_returns_completion_value() {
    let bridge = default_bridge();

    let out = bridge
        .invoke(
            "evaluateScript",
            vec![text("inputData.toUpperCase() + '!'"), text("hi")],
        )
        .await
        .unwrap();

    assert_eq!(out, "HI!");
}

#[tokio::test]
async fn unknown_operation_rejects_immediately() {
    let bridge = default_bridge();

    let mut handle = bridge.invoke("launchRockets", Vec::new());
    assert_eq!(handle.state(), DeferredState::Rejected);
    assert!(matches!(
        handle.await,
        Err(BridgeError::UnknownOperation(name)) if name == "launchRockets"
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invocations_are_isolated() {
    const INVOCATIONS: i32 = 16;
    let bridge = default_bridge();

    let handles: Vec<_> = (0..INVOCATIONS)
        .map(|id| {
            bridge.invoke(
                "transformData",
                vec![
                    text(&format!(r#"{{"id":{id}}}"#)),
                    text(scripts::LEAK_CHECK_TRANSFORM),
                ],
            )
        })
        .collect();

    let results = join_all(handles).await;

    for (id, result) in (0..INVOCATIONS).zip(results) {
        let doc = decode(&result.unwrap()).unwrap();
        assert_eq!(doc["id"], json!(id), "results must not be swapped");
        assert_eq!(doc["sawForeignState"], json!(false), "guest state leaked");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn invocations_do_not_wait_for_each_other() {
    let bridge = default_bridge();

    let slow = bridge.invoke(
        "transformData",
        vec![
            text(r#"{"id":"slow","spinMs":400}"#),
            text(scripts::SLOW_TRANSFORM),
        ],
    );
    let started = Instant::now();
    let fast = bridge.invoke("healthCheck", Vec::new()).await;

    fast.unwrap();
    assert!(
        started.elapsed() < Duration::from_millis(400),
        "health check waited for the slow transformation"
    );
    assert_eq!(slow.await.unwrap(), r#"{"id":"slow"}"#);
}

#[tokio::test]
async fn guest_timeout_rejects_only_that_invocation() {
    let registry = builtin::default_registry(BuiltinSettings {
        guest: GuestConfig::default().with_timeout(Some(Duration::from_millis(100))),
        ..settings()
    })
    .unwrap();
    let bridge = Bridge::new(registry);

    let looping = bridge.invoke(
        "transformData",
        vec![text("{}"), text(scripts::INFINITE_LOOP)],
    );
    let healthy = bridge.invoke("healthCheck", Vec::new());

    let err = looping.await.unwrap_err();
    assert_eq!(err.kind(), "GuestTimeoutError");
    healthy.await.unwrap();
}

struct Explode;

impl Operation for Explode {
    fn name(&self) -> &'static str {
        "explode"
    }

    fn contract(&self) -> Contract {
        Contract::new("Always panics", Vec::new())
    }

    fn call(&self, _args: &[HostValue]) -> BridgeResult<String> {
        panic!("kaboom");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn panic_is_contained_to_its_invocation() {
    let registry = OperationRegistry::builder()
        .register(TransformData::new(
            GuestEngine::default(),
            Arc::new(FixedClock::standard()),
            "ok",
        ))
        .unwrap()
        .register(HealthCheck::new("up"))
        .unwrap()
        .register(Explode)
        .unwrap()
        .build();
    let bridge = Bridge::new(registry);

    let before = bridge.invoke(
        "transformData",
        vec![text(r#"{"id":1,"spinMs":100}"#), text(scripts::SLOW_TRANSFORM)],
    );
    let boom = bridge.invoke("explode", Vec::new());
    let after = bridge.invoke("healthCheck", Vec::new());

    let err = boom.await.unwrap_err();
    assert!(err.is_fault());
    assert_eq!(err.to_string(), "panic occurred: kaboom");

    assert_eq!(before.await.unwrap(), r#"{"id":1}"#);
    assert!(after.await.unwrap().contains("healthy"));

    // The bridge keeps serving after a fault.
    bridge.invoke("healthCheck", Vec::new()).await.unwrap();
}

#[test]
fn blocking_wait_outside_async_runtime() {
    let bridge = default_bridge();

    let out = bridge
        .invoke("transformData", vec![text("[1,2,3]")])
        .wait()
        .unwrap();

    assert_eq!(decode(&out).unwrap()["original"], json!([1, 2, 3]));
}

#[test]
fn operations_are_listed_with_contracts() {
    let bridge = default_bridge();

    let names: Vec<&str> = bridge.operations().iter().map(|op| op.name).collect();
    assert_eq!(names, ["evaluateScript", "healthCheck", "transformData"]);

    let transform = bridge
        .operations()
        .into_iter()
        .find(|op| op.name == "transformData")
        .unwrap();
    assert_eq!(transform.contract.min_args(), 1);
    assert_eq!(transform.contract.max_args(), 2);
}
