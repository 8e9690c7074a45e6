//! CLI integration tests for the `contractly` subcommands.
//!
//! Uses `assert_cmd` to spawn the binary and verify exit codes, stdout
//! content, and stderr content.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn contractly() -> Command {
    cargo_bin_cmd!("contractly")
}

/// Write `contents` to `name` inside a fresh temp dir.
fn blueprint_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (dir, path)
}

const GOOD_BLUEPRINT: &str = r#"{
  "name": "NDA",
  "fields": [
    {"type": "Text", "label": "Party Name", "placeholder": "e.g., Full Legal Name"},
    {"type": "Signature", "label": "Signature"},
    {"type": "Checkbox", "label": "I accept the terms"}
  ]
}"#;

const NO_TERMS_BLUEPRINT: &str = r#"{
  "name": "Loose",
  "fields": [{"id": "party", "type": "Text", "label": ""}]
}"#;

// ──────────────────────────────────────────────
// Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    contractly()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Contract lifecycle server and tooling",
        ));
}

#[test]
fn version_exits_0() {
    contractly()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("contractly"));
}

#[test]
fn unknown_subcommand_fails() {
    contractly().arg("frobnicate").assert().failure();
}

// ──────────────────────────────────────────────
// transitions
// ──────────────────────────────────────────────

#[test]
fn transitions_prints_table() {
    contractly()
        .arg("transitions")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created -> Approved"))
        .stdout(predicate::str::contains("Signed -> Locked"))
        .stdout(predicate::str::contains("terminal: Locked, Revoked"))
        .stdout(predicate::str::contains("Locked ->").not());
}

#[test]
fn transitions_json_is_machine_readable() {
    let output = contractly()
        .args(["--output", "json", "transitions"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["transitions"].as_array().unwrap().len(), 7);
    assert_eq!(body["terminal"], serde_json::json!(["Locked", "Revoked"]));
    assert_eq!(body["statuses"].as_array().unwrap().len(), 6);
}

// ──────────────────────────────────────────────
// lint
// ──────────────────────────────────────────────

#[test]
fn lint_clean_blueprint_is_ok() {
    let (_dir, path) = blueprint_file("nda.json", GOOD_BLUEPRINT);
    contractly()
        .arg("lint")
        .arg(&path)
        .arg("--strict")
        .assert()
        .success()
        .stdout(predicate::str::contains(": ok"));
}

#[test]
fn lint_reports_missing_terms_checkbox() {
    let (_dir, path) = blueprint_file("loose.json", NO_TERMS_BLUEPRINT);
    contractly()
        .arg("lint")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "expected exactly one terms-acceptance Checkbox field, found 0",
        ))
        .stdout(predicate::str::contains("warning [party]"));
}

#[test]
fn lint_strict_fails_on_warnings() {
    let (_dir, path) = blueprint_file("loose.json", NO_TERMS_BLUEPRINT);
    contractly()
        .arg("lint")
        .arg(&path)
        .arg("--strict")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn lint_json_output_lists_warnings() {
    let (_dir, path) = blueprint_file("loose.json", NO_TERMS_BLUEPRINT);
    let output = contractly()
        .args(["--output", "json", "lint"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let warnings = body["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0]["field_id"], "party");
}

#[test]
fn lint_missing_file_fails() {
    contractly()
        .args(["lint", "/nonexistent/blueprint.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading"));
}

#[test]
fn lint_malformed_json_reports_json_error() {
    let (_dir, path) = blueprint_file("bad.json", "{ not json");
    contractly()
        .args(["--output", "json", "lint"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error\""));
}

#[test]
fn lint_quiet_suppresses_errors() {
    contractly()
        .args(["--quiet", "lint", "/nonexistent/blueprint.json"])
        .assert()
        .failure()
        .stderr(predicate::str::is_empty());
}

// ──────────────────────────────────────────────
// serve argument validation
// ──────────────────────────────────────────────

#[test]
fn serve_rejects_half_tls_config() {
    let (_dir, cert) = blueprint_file("cert.pem", "");
    contractly()
        .arg("serve")
        .arg("--tls-cert")
        .arg(&cert)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--tls-cert and --tls-key"));
}

#[test]
fn serve_rejects_bad_config_file() {
    let (_dir, path) = blueprint_file("server.toml", "port = \"not a number\"\n");
    contractly()
        .arg("serve")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn serve_rejects_bad_env_port() {
    contractly()
        .arg("serve")
        .env("CONTRACTLY_PORT", "eighty")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONTRACTLY_PORT"));
}
