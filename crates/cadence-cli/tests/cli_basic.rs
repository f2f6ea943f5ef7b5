//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway data
//! directory and verify outputs.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "cadence-cli", "--"])
        .args(args)
        .env("CADENCE_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

/// Last whitespace-separated token of the first stdout line ("Group created: <id>").
fn created_id(stdout: &str) -> String {
    stdout
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().last())
        .expect("no id printed")
        .to_string()
}

#[test]
fn test_group_lifecycle() {
    let dir = TempDir::new().unwrap();
    let (code, out, _) = run_cli(dir.path(), &["group", "add", "Morning", "--recurrence", "weekly", "--anchor", "1"]);
    assert_eq!(code, 0, "group add failed");
    let gid = created_id(&out);

    let (code, out, _) = run_cli(dir.path(), &["group", "task", &gid, "Stretch"]);
    assert_eq!(code, 0);
    let tid = created_id(&out);

    let (code, out, _) = run_cli(dir.path(), &["group", "toggle", &gid, &tid]);
    assert_eq!(code, 0);
    assert!(out.contains("completed: true"));

    let (code, out, _) = run_cli(dir.path(), &["group", "show", &gid]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["progress"]["completed"], 1);
    assert_eq!(parsed["momentum"], "neutral");

    let (code, out, _) = run_cli(dir.path(), &["group", "list"]);
    assert_eq!(code, 0);
    let groups: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(groups.as_array().unwrap().len(), 1);
}

#[test]
fn test_group_invalid_anchor_fails() {
    let dir = TempDir::new().unwrap();
    let (code, _, err) = run_cli(dir.path(), &["group", "add", "Bad", "--recurrence", "weekly", "--anchor", "7"]);
    assert_eq!(code, 1);
    assert!(err.contains("error:"));

    let (_, out, _) = run_cli(dir.path(), &["group", "list"]);
    assert_eq!(out.trim(), "[]");
}

#[test]
fn test_unknown_group_fails() {
    let dir = TempDir::new().unwrap();
    let (code, _, err) = run_cli(dir.path(), &["group", "next", "missing"]);
    assert_eq!(code, 1);
    assert!(err.contains("not found"));
}

#[test]
fn test_milestone_derives_completion() {
    let dir = TempDir::new().unwrap();
    let (code, out, _) = run_cli(dir.path(), &["milestone", "add", "Release"]);
    assert_eq!(code, 0);
    let mid = created_id(&out);
    let (_, out, _) = run_cli(dir.path(), &["milestone", "task", &mid, "Tag"]);
    let tid = created_id(&out);

    let (code, out, _) = run_cli(dir.path(), &["milestone", "toggle", &mid, &tid]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["completed"], true);

    let (code, _, _) = run_cli(dir.path(), &["milestone", "complete", &mid, "--undo"]);
    assert_eq!(code, 1, "derived completion cannot be set by hand");
}

#[test]
fn test_daily_list() {
    let dir = TempDir::new().unwrap();
    let (code, out, _) = run_cli(dir.path(), &["daily", "todo", "Buy milk"]);
    assert_eq!(code, 0);
    let id = created_id(&out);

    let (code, _, _) = run_cli(dir.path(), &["daily", "toggle-todo", &id]);
    assert_eq!(code, 0);

    let (code, out, _) = run_cli(dir.path(), &["daily", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["all_time_completed"], 1);
    assert_eq!(parsed["todos"][0]["completed"], true);
}

#[test]
fn test_tick_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["tick"]);
    assert_eq!(code, 0);
    let (code, out, _) = run_cli(dir.path(), &["tick"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(parsed["resets"].as_array().unwrap().is_empty());
    assert!(parsed["rollover"].is_null());
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();
    let (code, out, _) = run_cli(dir.path(), &["config", "get", "persistence.debounce_ms"]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "1000");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "tick.interval_secs", "5"]);
    assert_eq!(code, 0);
    let (_, out, _) = run_cli(dir.path(), &["config", "get", "tick.interval_secs"]);
    assert_eq!(out.trim(), "5");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "tick.nope", "5"]);
    assert_eq!(code, 1);
}
