//! Behavioural smoke tests for the CLI entrypoint.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn cli_without_arguments_prints_help() {
    let mut cmd = cargo_bin_cmd!("pagedrop");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn cli_help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("pagedrop");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("freeze"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("publish"));
}

#[test]
fn deploy_without_confirmation_uploads_nothing() {
    let mut cmd = cargo_bin_cmd!("pagedrop");
    cmd.args(["deploy", "--source", "does-not-matter"])
        .env_remove("PAGEDROP_GITHUB_TOKEN")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("pass --yes"));
}

#[test]
fn publish_without_confirmation_freezes_nothing() {
    let mut cmd = cargo_bin_cmd!("pagedrop");
    cmd.args(["publish", "--origin", "http://127.0.0.1:9"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("pass --yes"));
}
