use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[timing]
initial_delay_s = 0.1
total_duration_open_s = 5.0
total_duration_close_s = 5.0

[data]
open = "OPEN"
close = "CLOSE"
stop = "STOP"
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn json_line(stdout: &[u8], key: &str) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(stdout);
    let line = stdout
        .lines()
        .find(|l| l.contains(key))
        .unwrap_or_else(|| panic!("no JSON line with {key}; stdout was: {stdout}"));
    serde_json::from_str(line).expect("valid JSON")
}

/// Validate the JSON schema for a successful move.
#[rstest]
fn json_move_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("shade").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--virtual-time")
        .arg("--config")
        .arg(&cfg)
        .arg("move")
        .arg("--percent")
        .arg("50");

    let out = cmd.assert().success().get_output().stdout.clone();
    let v = json_line(&out, "\"final_position\"");

    assert_eq!(v["final_position"].as_u64(), Some(50));
    assert_eq!(v["start_position"].as_u64(), Some(0));
    // Start delay plus 50 x 50 ms of travel on the virtual clock.
    assert_eq!(v["elapsed_ms"].as_u64(), Some(2600));
    let codes: Vec<&str> = v["codes"]
        .as_array()
        .expect("codes array")
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["OPEN", "STOP"]);
}

#[rstest]
fn json_plan_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("shade").unwrap();
    cmd.args(["--json", "--log-level", "error", "--config"])
        .arg(&cfg)
        .args(["plan", "--percent", "30", "--from", "80"]);

    let out = cmd.assert().success().get_output().stdout.clone();
    let v = json_line(&out, "\"direction\"");
    assert_eq!(v["direction"], "closing");
    assert_eq!(v["from"].as_u64(), Some(80));
    assert_eq!(v["target"].as_u64(), Some(30));
    assert_eq!(v["per_percent_ms"].as_f64(), Some(50.0));
    assert_eq!(v["travel_ms"].as_f64(), Some(2500.0));
    assert_eq!(v["total_ms"].as_f64(), Some(2600.0));
    assert_eq!(v["codes"], serde_json::json!(["CLOSE", "STOP"]));
}

/// Errors in JSON mode are a single object with a reason and a message.
#[rstest]
fn json_error_schema() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[timing]\ntick_ms = 0\n[data]\nopen = \"O\"\nclose = \"C\"\nstop = \"S\"\n")
        .unwrap();

    let mut cmd = Command::cargo_bin("shade").unwrap();
    cmd.args(["--json", "--config"]).arg(&path).arg("self-check");

    let out = cmd.assert().code(2).get_output().stdout.clone();
    let v = json_line(&out, "\"reason\"");
    assert_eq!(v["reason"], "Config");
    assert!(v["message"].as_str().unwrap().contains("tick_ms must be >= 1"));
}
