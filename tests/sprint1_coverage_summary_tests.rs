//! Sprint 1: Per-file coverage summary tests
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests
//!
//! Drive the binary over trace files and check the summary lines

use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_trace(dir: &TempDir, name: &str, entries: serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, entries.to_string()).unwrap();
    path
}

/// 7 known calls over 3 names and 3 calls of one unresolved number
fn mixed_trace() -> serde_json::Value {
    json!([
        {"read": {"fd": 3}},
        {"read": {"fd": 3}},
        {"read": {"fd": 4}},
        {"write": {"fd": 1}},
        {"write": {"fd": 1}},
        {"close": {"fd": 3}},
        {"close": {"fd": 4}},
        {"unknown": {"id": 302, "args": [0, 0, 0, 0, 0, 0], "return_value": 0}},
        {"unknown": {"id": 302, "args": [0, 0, 0, 0, 0, 0], "return_value": 0}},
        {"unknown": {"id": 302, "args": [0, 0, 0, 0, 0, 0], "return_value": 0}},
        {"syscall_error": "error 'ESRCH' on syscall Read"}
    ])
}

#[test]
fn test_summary_line_for_mixed_trace() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, "dolphin.json", mixed_trace());

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("syscov");
    cmd.arg("--resolver")
        .arg("none")
        .arg("--no-figure")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("coverage of all syscalls"))
        .stdout(predicate::str::contains(format!(
            "[{}], [70.00], [10], [75.00], [4]",
            trace.display()
        )));
}

#[test]
fn test_one_summary_line_per_file_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_trace(&dir, "neovim.json", json!([{"read": {}}]));
    let b = write_trace(&dir, "krita.json", json!([{"unknown": {"id": 1}}]));

    let output = assert_cmd::cargo::cargo_bin_cmd!("syscov")
        .args(["--resolver", "none", "--no-figure"])
        .arg(&a)
        .arg(&b)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let neovim = stdout.find("neovim.json], [100.00]").unwrap();
    let krita = stdout.find("krita.json], [0.00]").unwrap();
    assert!(neovim < krita);
}

#[test]
fn test_empty_trace_reported_as_not_applicable() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(
        &dir,
        "chromium.json",
        json!([{"syscall_error": "a"}, {"syscall_error": "b"}]),
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("syscov");
    cmd.args(["--resolver", "none", "--no-figure"])
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("[N/A], [0], [N/A], [0]"))
        .stdout(predicate::str::contains("NaN").not());
}

#[test]
fn test_empty_trace_aborts_with_abort_policy() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, "chromium.json", json!([]));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("syscov");
    cmd.args(["--resolver", "none", "--no-figure", "--empty-policy", "abort"])
        .arg(&trace)
        .assert()
        .failure()
        .stderr(predicate::str::contains("chromium"))
        .stderr(predicate::str::contains("coverage is undefined"));
}

#[test]
fn test_missing_file_aborts_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_trace(&dir, "vlc.json", json!([{"read": {}}]));
    let missing = dir.path().join("missing.json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("syscov");
    cmd.args(["--resolver", "none", "--no-figure"])
        .arg(&good)
        .arg(&missing)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn test_malformed_file_aborts_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_trace(&dir, "vlc.json", json!([{"read": {}}]));
    let bad = dir.path().join("broken.json");
    fs::write(&bad, r#"[{"read": {}, "write": {}}]"#).unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("syscov");
    cmd.args(["--resolver", "none", "--no-figure"])
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Malformed trace file"))
        .stderr(predicate::str::contains("broken.json"));
}

#[test]
fn test_file_list_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_trace(&dir, "a.json", json!([{"read": {}}, {"unknown": {"id": 5}}]));
    let b = write_trace(&dir, "b.json", json!([{"write": {}}]));
    let input = format!("{}\n\n{}\n", a.display(), b.display());

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("syscov");
    cmd.args(["--resolver", "none", "--no-figure"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("a.json], [50.00], [2], [50.00], [2]"))
        .stdout(predicate::str::contains("b.json], [100.00], [1], [100.00], [1]"));
}

#[test]
fn test_no_input_is_an_error() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("syscov");
    cmd.args(["--resolver", "none", "--no-figure"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No trace files given"));
}

#[test]
fn test_duplicate_program_names_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_trace(&dir, "vlc.json", json!([{"read": {}}]));
    fs::create_dir(dir.path().join("second")).unwrap();
    let b = write_trace(&dir, "second/vlc.json", json!([{"read": {}}]));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("syscov");
    cmd.args(["--resolver", "none", "--no-figure"])
        .arg(&a)
        .arg(&b)
        .assert()
        .failure()
        .stderr(predicate::str::contains("more than once"));
}
