use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Fast covering: 5 s open, 3 s close; runs use --virtual-time anyway.
fn write_valid_config(dir: &tempfile::TempDir, extra: &str) -> PathBuf {
    let toml = format!(
        r#"
name = "test blind"
{extra}

[timing]
initial_delay_s = 0.1
total_duration_open_s = 5.0
total_duration_close_s = 3.0

[data]
open = "OPEN"
close = "CLOSE"
stop = "STOP"
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn shade(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("shade").unwrap();
    cmd.arg("--config")
        .arg(cfg)
        .arg("--log-level")
        .arg("error")
        .arg("--virtual-time");
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["move", "--percent", "50"], 0, "final position: 50%", "stdout")]
#[case(&["move"], 2, "required", "stderr")]
#[case(&["move", "--percent", "10", "--from", "101"], 2, "101", "stderr")]
#[case(&["sequence", "20", "50@0.5"], 0, "final position: 50%", "stdout")]
#[case(&["plan", "--percent", "100"], 0, "OPEN, STOP", "stdout")]
#[case(&["self-check"], 0, "OK: test blind", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir, "");

    let mut cmd = shade(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        _ => {
            assert.stderr(predicate::str::contains(needle));
        }
    }
}

#[test]
fn move_reports_codes_in_order() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir, "");
    shade(&cfg)
        .args(["sequence", "90", "60@5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("codes sent: OPEN, STOP, CLOSE, STOP"))
        .stdout(predicate::str::contains("final position: 60%"));
}

#[test]
fn missing_config_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    Command::cargo_bin("shade")
        .unwrap()
        .arg("--config")
        .arg(&missing)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("What happened: The config file"))
        .stderr(predicate::str::contains("read config"));
}

#[test]
fn invalid_timing_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(
        &path,
        r#"
[timing]
total_duration_open_s = 0.0
[data]
open = "OPEN"
close = "CLOSE"
stop = "STOP"
"#,
    )
    .unwrap();
    Command::cargo_bin("shade")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .args(["move", "--percent", "10"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("total_duration_open_s must be > 0"));
}

#[test]
fn persisted_position_survives_between_runs() {
    let dir = tempdir().unwrap();
    let state = dir.path().join("state.json");
    let extra = format!(
        "persist_state = true\nstate_file = {:?}",
        state.to_string_lossy()
    );
    let cfg = write_valid_config(&dir, &extra);

    shade(&cfg)
        .args(["move", "--percent", "40"])
        .assert()
        .success();
    let saved = fs::read_to_string(&state).unwrap();
    assert!(saved.contains("\"current_position\":40"), "{saved}");

    // Second run starts from 40, so only 20% of closing travel remains.
    shade(&cfg)
        .args(["--json", "move", "--percent", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"start_position\":40"))
        .stdout(predicate::str::contains("\"final_position\":20"));
}

#[test]
fn plan_with_completely_codes_omits_stop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    fs::write(
        &path,
        r#"
[timing]
total_duration_open_s = 5.0
[data]
open = "OPEN"
close = "CLOSE"
stop = "STOP"
open_completely = "OPEN_ALL"
"#,
    )
    .unwrap();
    shade(&path)
        .args(["plan", "--percent", "100", "--from", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from 20% to 100% (opening)"))
        .stdout(predicate::str::contains("per percent: 50.0 ms"))
        .stdout(predicate::str::contains("travel: 4000.0 ms"))
        .stdout(predicate::str::contains("codes: OPEN_COMPLETELY"));
}
