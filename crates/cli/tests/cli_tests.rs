use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("pmos").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Gamified multi-agent product management backend"));
}

#[test]
fn test_cli_serve_help() {
    let mut cmd = Command::cargo_bin("pmos").unwrap();
    cmd.arg("serve").arg("--help").assert().success().stdout(predicate::str::contains("port"));
}

#[test]
fn test_cli_level() {
    let mut cmd = Command::cargo_bin("pmos").unwrap();
    cmd.args(["level", "750"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"level\": 3"));
}
