//! Smoke tests for the conduit-e2e CLI
//!
//! None of these launch a browser.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the conduit-e2e binary
fn conduit_e2e() -> Command {
    let mut cmd = Command::cargo_bin("conduit-e2e").expect("conduit-e2e binary should exist");
    for key in [
        "CONDUIT_E2E_BASE_URL",
        "CONDUIT_E2E_HEADLESS",
        "CONDUIT_E2E_CHROMIUM_PATH",
        "CONDUIT_E2E_NO_SANDBOX",
        "CONDUIT_E2E_STEP_PAUSE_MS",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn test_help_flag() {
    conduit_e2e()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conduit"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_no_args_fails() {
    conduit_e2e().assert().failure();
}

#[test]
fn test_list_shows_all_scenarios() {
    conduit_e2e()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("login-valid"))
        .stdout(predicate::str::contains("login-invalid-email"))
        .stdout(predicate::str::contains("login-wrong-password"))
        .stdout(predicate::str::contains("article-lifecycle"));
}

#[test]
fn test_list_json() {
    let output = conduit_e2e()
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 4);
}

#[test]
fn test_run_rejects_unknown_scenario() {
    conduit_e2e()
        .args(["run", "logout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scenario `logout`"));
}

#[test]
fn test_config_merges_file_and_flags() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("e2e.yaml");
    fs::write(&path, "base_url: http://file.test\nretries: 1\n").unwrap();

    conduit_e2e()
        .args(["config", "--config"])
        .arg(&path)
        .args(["--retries", "2", "--headed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url: http://file.test"))
        .stdout(predicate::str::contains("retries: 2"))
        .stdout(predicate::str::contains("headless: false"));
}

#[test]
fn test_config_rejects_bad_base_url() {
    conduit_e2e()
        .args(["config", "--base-url", "localhost:4100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn test_env_overrides_defaults() {
    conduit_e2e()
        .arg("config")
        .env("CONDUIT_E2E_STEP_PAUSE_MS", "1500")
        .assert()
        .success()
        .stdout(predicate::str::contains("step_pause: 1500"));
}
