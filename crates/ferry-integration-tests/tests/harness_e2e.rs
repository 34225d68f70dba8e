//! End-to-end tests of the module harness: file loading, the add smoke
//! check, failure classes, and the Extism echo plugin.

use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

use ferry_harness::{
    CheckSpec, HarnessConfig, HarnessError, ImportSet, ModuleHarness, ModuleSource, Number,
    PluginRunner,
};
use ferry_test::fixtures;

fn write_module(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn add_smoke_check_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_module(dir.path(), "add.wasm", &fixtures::add_module());
    let harness = ModuleHarness::with_defaults().unwrap();

    let report = harness
        .run_check(&CheckSpec::add_smoke(ModuleSource::File(path)))
        .unwrap();

    assert_eq!(report.export, "add");
    assert_eq!(report.args, vec![Number::I32(5), Number::I32(3)]);
    assert_eq!(report.result, Number::I32(8));
    assert!(report.verified);
    assert_eq!(report.module_hash.len(), 64);
}

#[test]
fn failure_classes() {
    let dir = tempfile::tempdir().unwrap();
    let harness = ModuleHarness::with_defaults().unwrap();

    let missing = dir.path().join("missing.wasm");
    let err = harness
        .run_check(&CheckSpec::add_smoke(ModuleSource::File(missing)))
        .unwrap_err();
    assert!(matches!(err, HarnessError::Io { .. }), "got: {err:?}");

    let truncated = write_module(dir.path(), "bad.wasm", &fixtures::truncated_module());
    let err = harness
        .run_check(&CheckSpec::add_smoke(ModuleSource::File(truncated)))
        .unwrap_err();
    assert!(matches!(err, HarnessError::Compile(_)), "got: {err:?}");

    let err = harness
        .run_check(&CheckSpec::add_smoke(ModuleSource::Bytes(
            fixtures::module_without_add(),
        )))
        .unwrap_err();
    match err {
        HarnessError::ExportNotFound { name, available } => {
            assert_eq!(name, "add");
            assert_eq!(available, vec!["sub"]);
        },
        other => panic!("expected ExportNotFound, got: {other:?}"),
    }

    let err = harness
        .run_check(&CheckSpec::new(ModuleSource::Bytes(fixtures::trapping_module()), "boom"))
        .unwrap_err();
    assert!(matches!(err, HarnessError::Trap(_)), "got: {err:?}");

    let err = harness
        .run_check(
            &CheckSpec::add_smoke(ModuleSource::Bytes(fixtures::add_module())).expecting("9"),
        )
        .unwrap_err();
    assert!(err.is_verification_failure());
    assert_eq!(err.to_string(), "verification failed: expected 9, got 8");
}

#[test]
fn fuel_stops_runaway_module() {
    let harness = ModuleHarness::new(HarnessConfig::default().with_fuel(10_000)).unwrap();
    let module = harness.compile(&fixtures::looping_module()).unwrap();
    let mut instance = harness.instantiate(&module, &ImportSet::empty()).unwrap();
    let spin = instance.resolve_export("spin").unwrap();

    let err = instance.call_values(&spin, &[]).unwrap_err();

    assert!(matches!(err, HarnessError::Trap(_)), "got: {err:?}");
}

#[test]
fn identical_modules_compile_once() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_module(dir.path(), "a.wasm", &fixtures::add_module());
    let b = write_module(dir.path(), "b.wasm", &fixtures::add_module());
    let harness = ModuleHarness::with_defaults().unwrap();

    let first = harness.load(&a).unwrap();
    let second = harness.load(&b).unwrap();

    assert_eq!(first.hash(), second.hash());
    assert_eq!(harness.cached_modules(), 1);
}

static BUILD_FIXTURE: Once = Once::new();

fn echo_guest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test-echo-guest")
}

/// Build the `test-echo-guest` crate to WASM.
fn build_fixture() -> PathBuf {
    let guest_dir = echo_guest_dir();
    BUILD_FIXTURE.call_once(|| {
        let status = std::process::Command::new("cargo")
            .env_remove("RUSTFLAGS")
            .env_remove("CARGO_ENCODED_RUSTFLAGS")
            .args(["build", "--release", "--target", "wasm32-unknown-unknown"])
            .current_dir(&guest_dir)
            .status()
            .expect("failed to invoke cargo for test-echo-guest");
        assert!(status.success(), "failed to compile test-echo-guest to WASM");
    });
    guest_dir.join("target/wasm32-unknown-unknown/release/test_echo_guest.wasm")
}

#[test]
#[ignore = "needs the wasm32-unknown-unknown target"]
fn extism_echo_plugin_round_trip() {
    let path = build_fixture();
    let mut runner = PluginRunner::load_file(&path, Duration::from_secs(30)).unwrap();

    assert!(runner.has_function("echo"));
    assert!(runner.exports().iter().any(|e| e == "add"));

    assert_eq!(runner.call("echo", "hello").unwrap(), "Echo: hello");
    assert_eq!(runner.expect("add", "5,3", "8").unwrap(), "8");

    let err = runner.expect("add", "5,3", "9").unwrap_err();
    assert!(err.is_verification_failure());

    let err = runner.call("add", "five").unwrap_err();
    assert!(matches!(err, HarnessError::Plugin(_)), "got: {err:?}");

    let err = runner.call("missing", "").unwrap_err();
    assert!(matches!(err, HarnessError::ExportNotFound { .. }), "got: {err:?}");
}
