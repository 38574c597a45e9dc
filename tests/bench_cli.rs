//! Tests for the vector-bench binary.

mod common;

use std::process::Command;

use common::{quiet_config, temp_config};

fn bench_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_vector-bench"))
}

#[test]
fn help_lists_options() {
    let output = bench_cmd()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--producers"));
    assert!(stdout.contains("--strategy"));
}

#[test]
fn store_run_reports_consistent_json() {
    let (_dir, path) = quiet_config();
    let output = bench_cmd()
        .args(["--jobs", "300", "--producers", "3", "--reads", "10", "--json"])
        .arg("--config")
        .arg(&path)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["strategy"], "store");
    assert_eq!(report["final_count"], 300);
    assert_eq!(report["consistent"], true);
    assert_eq!(report["stats"]["reducers_applied"], 300);
}

#[test]
fn locked_run_prints_text_report() {
    let (_dir, path) = quiet_config();
    let output = bench_cmd()
        .args(["--jobs", "100", "--strategy", "locked"])
        .arg("--config")
        .arg(&path)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("final count: 100 (consistent)"));
}

#[test]
fn zero_producers_exits_with_error() {
    let (_dir, path) = quiet_config();
    let output = bench_cmd()
        .args(["--producers", "0"])
        .arg("--config")
        .arg(&path)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: --producers must be at least 1"));
}

#[test]
fn invalid_config_exits_with_error() {
    let (_dir, path) = temp_config("[logging]\ntag = \"\"\n");
    let output = bench_cmd()
        .arg("--config")
        .arg(&path)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Config validation failed"));
}
