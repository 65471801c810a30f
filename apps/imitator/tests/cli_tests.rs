//! 命令行集成测试

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn imitator() -> Command {
    let mut cmd = Command::cargo_bin("arm-imitator").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_print_config_shows_defaults() {
    let file = config_file("");
    imitator()
        .arg("--config")
        .arg(file.path())
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("topic = \"/icub/jointPose\""))
        .stdout(predicate::str::contains("period_ms = 500"));
}

#[test]
fn test_bind_overrides_config() {
    let file = config_file("[control]\nperiod_ms = 250\n");
    imitator()
        .arg("--config")
        .arg(file.path())
        .args(["--bind", "127.0.0.1:9999", "--print-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("period_ms = 250"))
        .stdout(predicate::str::contains("bind_addr = \"127.0.0.1:9999\""));
}

#[test]
fn test_timing_is_not_a_flag() {
    imitator().args(["--run-time", "5"]).assert().failure();
    imitator().args(["--period-ms", "5"]).assert().failure();
}

#[test]
fn test_missing_config_fails() {
    imitator()
        .args(["--config", "/nonexistent/arm-imitator.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/arm-imitator.toml"));
}

#[test]
fn test_invalid_config_fails() {
    let file = config_file("[control]\nscale = -1.0\n");
    imitator().arg("--config").arg(file.path()).assert().failure();
}

#[test]
fn test_transport_unavailable_exits_with_one() {
    let file = config_file("[pose]\nbind_addr = \"192.0.2.1:9870\"\n");
    imitator()
        .arg("--config")
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No pose transport available, quitting"));
}

#[test]
fn test_runs_until_deadline() {
    let file = config_file("[control]\nperiod_ms = 50\nrun_time_secs = 1\n");
    imitator()
        .arg("--config")
        .arg(file.path())
        .args(["--bind", "127.0.0.1:0"])
        .assert()
        .success();
}
