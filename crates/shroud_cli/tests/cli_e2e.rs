//! End-to-end tests for global CLI behaviour (help, version, etc.).

use assert_cmd::Command;
use predicates::prelude::*;

fn shroud() -> Command {
    Command::new(env!("CARGO_BIN_EXE_shroud"))
}

#[test]
fn help_shows_usage() {
    shroud()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("patterns"))
        .stdout(predicate::str::contains("settings"));
}

#[test]
fn version_prints_package_version() {
    shroud()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_arguments_prints_help() {
    shroud().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn unknown_output_format_is_rejected() {
    shroud()
        .args(["scan", "-f", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("yaml"));
}
