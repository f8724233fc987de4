// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box CLI tests: invoke the `cw` binary and verify stdout, stderr,
//! and exit codes. None of these need a running daemon.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use assert_cmd::Command;
use predicates::prelude::*;

fn cw(state_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("cw").unwrap();
    cmd.env("CW_STATE_DIR", state_dir);
    cmd.env("CW_ACCOUNT", "test-account");
    cmd
}

#[test]
fn help_lists_the_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    cw(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("rollover"))
        .stdout(predicate::str::contains("queue"))
        .stdout(predicate::str::contains("daemon"));
}

#[test]
fn version_prints_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    cw(dir.path()).arg("--version").assert().success();
}

#[test]
fn daemon_status_reports_not_running() {
    let dir = tempfile::tempdir().unwrap();
    cw(dir.path())
        .args(["daemon", "status"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("daemon not running"));
}

#[test]
fn commands_fail_helpfully_without_a_daemon() {
    let dir = tempfile::tempdir().unwrap();
    cw(dir.path())
        .args(["watch", "ls"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cw daemon start"));
}

#[test]
fn watch_add_requires_its_arguments() {
    let dir = tempfile::tempdir().unwrap();
    cw(dir.path())
        .args(["watch", "add"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}

#[test]
fn unknown_subcommands_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    cw(dir.path()).arg("frobnicate").assert().failure();
}
