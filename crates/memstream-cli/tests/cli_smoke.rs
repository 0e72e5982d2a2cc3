//! Binary smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn memstream() -> Command {
    let mut cmd = Command::cargo_bin("memstream").unwrap();
    cmd.env_remove("MEMSTREAM_BACKEND").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_works() {
    memstream().arg("--help").assert().success();
}

#[test]
fn version_works() {
    memstream()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_mentions_core_flags() {
    let out = memstream().arg("--help").assert().success().get_output().stdout.clone();
    let s = String::from_utf8(out).unwrap();
    for needle in ["--arraysize", "--numtimes", "--only", "--order", "--csv", "--silence-errors"] {
        assert!(s.contains(needle), "help missing `{needle}`");
    }
}

#[test]
fn print_names() {
    memstream()
        .arg("--print-names")
        .assert()
        .success()
        .stdout("Available benchmarks: Copy,Mul,Add,Triad,Dot,Nstream\n");
}

#[test]
fn list_devices() {
    memstream()
        .args(["--list", "--backend", "serial"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("0: CPU"));
}

#[test]
fn small_run_succeeds() {
    memstream()
        .args(["-s", "4096", "-n", "3", "--backend", "serial"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Running Classic kernels 3 times in Classic order"))
        .stdout(predicate::str::contains("Function    MB/s"))
        .stdout(predicate::str::contains("Triad"));
}

#[test]
fn default_backend_runs_every_kernel() {
    memstream()
        .args(["-s", "20000", "-n", "2", "-o", "All", "--csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nstream,2,20000,8,"));
}

#[test]
fn single_repetition_fails() {
    memstream()
        .args(["-n", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("must be 2 or more"));
}

#[test]
fn zero_array_size_fails() {
    memstream()
        .args(["-s", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid array size 0"));
}

#[test]
fn huge_array_size_is_a_construction_error() {
    memstream()
        .args(["-s", "4611686018427387904", "-n", "2", "--backend", "serial"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Number of elements: 4611686018427387904"))
        .stderr(predicate::str::contains("cannot allocate 4611686018427387904 elements"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn huge_array_size_with_csv_and_parallel_backend() {
    memstream()
        .args(["-s", "1152921504606846976", "-n", "2", "--csv", "--float"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot allocate"));
}

#[test]
fn conflicting_formats_are_a_usage_error() {
    memstream().args(["--csv", "--json"]).assert().code(2);
}

#[test]
fn unknown_benchmark_lists_valid_names() {
    memstream()
        .args(["--only", "Scale"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("All, Classic, Copy, Mul, Add, Triad, Dot, Nstream"));
}

#[test]
fn unknown_order_is_rejected() {
    memstream().args(["--order", "Random"]).assert().code(2);
}

#[test]
fn invalid_device_fails() {
    memstream()
        .args(["-s", "16", "-n", "2", "--backend", "serial", "--device", "9"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid device index 9"));
}

#[test]
fn unknown_backend_in_env_fails() {
    memstream()
        .env("MEMSTREAM_BACKEND", "opencl")
        .args(["-s", "16", "-n", "2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown backend"));
}

#[test]
fn json_logs_go_to_stderr() {
    let assert = memstream()
        .args(["-s", "64", "-n", "2", "--json", "--backend", "serial"])
        .args(["--log-level", "info", "--log-format", "json"])
        .assert()
        .success();
    let output = assert.get_output();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["implementation"], "serial");
    assert!(String::from_utf8_lossy(&output.stderr).contains("running kernels"));
}
