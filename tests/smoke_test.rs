//! Smoke tests for the nomad-conf CLI.
//!
//! These tests verify basic CLI functionality:
//! - `nomad-conf --version` outputs version info
//! - `nomad-conf --help` outputs help text
//! - errors exit 1 with a readable message

mod common;

use assert_cmd::Command;
use common::TestEnv;
use predicates::prelude::*;

fn nc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_nomad-conf"))
}

#[test]
fn test_version_flag() {
    nc().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nomad-conf"))
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_long_version_has_build_info() {
    nc().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("commit:"))
        .stdout(predicate::str::contains("built:"));
}

#[test]
fn test_help_flag() {
    nc().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn test_no_args_is_usage_error() {
    nc().assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_error_exit_code_and_message() {
    let env = TestEnv::new();
    env.nc()
        .args(["var", "get", "a:b:c"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: invalid variable spec"));
}

#[test]
fn test_error_json() {
    let env = TestEnv::new();
    env.nc()
        .args(["--json", "var", "get", "missing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(r#""error":"#))
        .stderr(predicate::str::contains("variable missing does not exist"));
}
