//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own preferences directory.

use std::path::Path;
use std::process::Command;

use serde_json::{json, Value};
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(config_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_clearwatch"))
        .args(args)
        .env("CLEARWATCH_CONFIG_DIR", config_dir)
        .env_remove("CLEARWATCH_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}

fn record(hash: u32, modes: &[u32], period: &str, seconds: u64, instance: &str) -> Value {
    json!({
        "period": period,
        "instanceId": instance,
        "completed": true,
        "durationSeconds": seconds,
        "activityHash": hash,
        "categoryHints": modes,
    })
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("replay"));
    assert!(stdout.contains("stats"));
}

#[test]
fn test_config_set_get_roundtrip() {
    let dir = TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.mode"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "default");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.mode", "persistent"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "timer.mode"]);
    assert_eq!(stdout.trim(), "persistent");
    assert!(dir.path().join("preferences.toml").exists());
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = TempDir::new().unwrap();

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "filter.timespan", "14"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"), "{stderr}");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_groups_json_lists_grouped_raids() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["groups", "--json"]);
    assert_eq!(code, 0);

    let rows: Vec<Value> = serde_json::from_str(&stdout).unwrap();
    assert!(rows
        .iter()
        .any(|row| row["selector"] == "grouped-raid-last-wish"));
}

#[test]
fn test_stats_counts_todays_raids() {
    let dir = TempDir::new().unwrap();
    let history = json!([
        record(2122313384, &[4], "2024-03-07T17:30:00Z", 600, "a"),
        record(4078656646, &[82], "2024-03-07T17:40:00Z", 900, "b"),
        record(2122313384, &[4], "2024-03-07T16:00:00Z", 1200, "c"),
    ]);
    let file = write_json(&dir, "history.json", &history);

    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &[
            "stats",
            &file,
            "--timespan",
            "1",
            "--category",
            "raids",
            "--now",
            "2024-03-07T18:00:00Z",
        ],
    );
    assert_eq!(code, 0, "{stderr}");

    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["summary"]["count"], 1);
    assert_eq!(report["summary"]["averageSeconds"], 600.0);
}

#[test]
fn test_stats_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    let (_, stderr, code) = run_cli(dir.path(), &["stats", missing.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("cannot read"), "{stderr}");
}

#[test]
fn test_replay_persistent_completion() {
    let dir = TempDir::new().unwrap();
    let profile = json!({ "displayName": "Guardian", "displayTag": 1234 });
    let frames = json!([
        {
            "at": "2024-03-07T18:00:00Z",
            "status": { "lastUpdate": {
                "currentActivity": {
                    "startDate": "2024-03-07T17:59:00Z",
                    "activityHash": 2122313384,
                    "categoryHints": [4]
                },
                "activityHistory": [],
                "profileInfo": profile
            }}
        },
        {
            "at": "2024-03-07T18:10:00Z",
            "status": { "lastUpdate": {
                "activityHistory": [record(2122313384, &[4], "2024-03-07T17:59:00Z", 600, "a")],
                "profileInfo": profile
            }}
        },
        {
            "at": "2024-03-07T18:10:05Z",
            "status": { "lastUpdate": {
                "activityHistory": [record(2122313384, &[4], "2024-03-07T17:59:00Z", 600, "a")],
                "profileInfo": profile
            }}
        }
    ]);
    let file = write_json(&dir, "frames.json", &frames);

    let (stdout, stderr, code) = run_cli(dir.path(), &["replay", &file, "--mode", "persistent"]);
    assert_eq!(code, 0, "{stderr}");

    let lines: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);

    assert_eq!(lines[0]["events"][0]["type"], "TrackingStarted");
    assert_eq!(lines[0]["timer"]["isRunning"], true);
    assert_eq!(lines[0]["monitor"]["popups"][0]["subtext"], "clearwatch is active.");

    assert_eq!(lines[1]["events"][0]["type"], "ActivityCompleted");
    assert_eq!(lines[1]["timer"]["isRunning"], false);
    assert_eq!(lines[1]["monitor"]["popups"][0]["title"], "Last Wish");

    assert_eq!(lines[2]["events"][0]["type"], "GraceReleased");
    assert_eq!(lines[2]["monitor"]["popups"].as_array().unwrap().len(), 0);
}

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("clearwatch"));
}
