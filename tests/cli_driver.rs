//! Integration tests for the `webidl2json` CLI driver's exit-code and
//! failure-count contract (§6.3). Kept light: the driver is explicitly out
//! of the core's tested-invariants scope (§8), but a complete crate in this
//! corpus still verifies its own binary end to end.

use std::fs;
use std::process::Command;

fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_webidl2json")
}

#[test]
fn file_mode_success_prints_json_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.idl");
    fs::write(&input, "interface Foo;").unwrap();

    let output = Command::new(binary()).arg(&input).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\"Foo\""));
}

#[test]
fn file_mode_failure_exits_nonzero_with_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.idl");
    fs::write(&input, "interface ;").unwrap();

    let output = Command::new(binary()).arg(&input).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error:"));
}

#[test]
fn directory_mode_writes_one_json_per_idl_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.idl"), "interface A;").unwrap();
    fs::write(dir.path().join("b.idl"), "interface B;").unwrap();

    let output = Command::new(binary()).arg(dir.path()).output().unwrap();
    assert!(output.status.success());
    assert!(dir.path().join("a.json").exists());
    assert!(dir.path().join("b.json").exists());
}

#[test]
fn directory_mode_counts_failures_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("good.idl"), "interface Good;").unwrap();
    fs::write(dir.path().join("bad.idl"), "interface ;").unwrap();

    let output = Command::new(binary()).arg(dir.path()).output().unwrap();
    assert!(!output.status.success());
    assert!(dir.path().join("good.json").exists());
    assert!(!dir.path().join("bad.json").exists());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("1 of 2 file(s) failed"));
}

#[test]
fn missing_input_path_exits_nonzero() {
    let output = Command::new(binary())
        .arg("/nonexistent/path/does/not/exist.idl")
        .output()
        .unwrap();
    assert!(!output.status.success());
}
