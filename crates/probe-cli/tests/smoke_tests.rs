//! Smoke tests for the shopprobe CLI

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the shopprobe binary
fn shopprobe() -> Command {
    let mut cmd = Command::cargo_bin("shopprobe").expect("shopprobe binary should exist");
    cmd.env_remove("SHOPPROBE_BASE_URL")
        .env_remove("SHOPPROBE_CONFIG")
        .env_remove("SHOPPROBE_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    shopprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_lists_subcommands() {
    shopprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    shopprobe().assert().failure();
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn test_run_all_on_mock_succeeds() {
    shopprobe()
        .args(["--color", "never", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"))
        .stdout(predicate::str::contains("9 scenarios, 14 rows, 0 failed"));
}

#[test]
fn test_run_login_json() {
    let output = shopprobe()
        .args(["run", "--suite", "login", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["suite"], "login");
    assert_eq!(json["scenarios"].as_array().unwrap().len(), 2);
}

#[test]
fn test_run_parallel_with_timeout() {
    shopprobe()
        .args(["--color", "never", "run", "--suite", "cart", "--parallel", "--timeout-ms", "5000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 rows, 0 failed"));
}

#[test]
fn test_failing_rows_exit_non_zero() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    // A title selector that matches nothing fails the valid-login row
    fs::write(&path, "locators:\n  page_title: .no-such-title\n").unwrap();

    shopprobe()
        .args(["--color", "never", "run", "--suite", "login", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL"))
        .stderr(predicate::str::contains("row(s) failed"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "base_url: ftp://example.com/\n").unwrap();

    shopprobe()
        .args(["run", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

// ============================================================================
// List and config
// ============================================================================

#[test]
fn test_list_shows_suites_and_rows() {
    shopprobe()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("log in with invalid credentials (4 row(s))"))
        .stdout(predicate::str::contains("cart"));
}

#[test]
fn test_config_show_prints_yaml() {
    shopprobe()
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url"))
        .stdout(predicate::str::contains("https://www.saucedemo.com/"))
        .stdout(predicate::str::contains("locators:"));
}

#[test]
fn test_base_url_env_override() {
    shopprobe()
        .args(["config"])
        .env("SHOPPROBE_BASE_URL", "http://localhost:8080/")
        .assert()
        .success()
        .stdout(predicate::str::contains("Base URL: http://localhost:8080/"));
}
