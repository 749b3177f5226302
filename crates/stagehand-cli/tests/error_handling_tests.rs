//! Exit codes and error messages.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn stagehand(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stagehand").unwrap();
    cmd.current_dir(temp.path())
        .env_remove("STAGEHAND_TEMPLATES_DIR")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    stagehand(&temp).assert().code(2);
}

#[test]
fn invalid_name_is_a_user_error() {
    let temp = TempDir::new().unwrap();
    stagehand(&temp)
        .args(["library", "bad$name"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid option 'name'"));
}

#[test]
fn existing_project_is_rejected() {
    let temp = TempDir::new().unwrap();
    stagehand(&temp).args(["library", "ui"]).assert().success();
    stagehand(&temp)
        .args(["library", "ui"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn stories_against_a_disabled_component_conflict() {
    let temp = TempDir::new().unwrap();
    stagehand(&temp)
        .args(["library", "ui", "--storybook", "--stories", "--no-component"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Conflicting options"));
    assert!(!temp.path().join("libs").exists());
}

#[test]
fn unknown_project_for_component() {
    let temp = TempDir::new().unwrap();
    stagehand(&temp)
        .args(["component", "Button", "--project", "ghost"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn missing_workspace_directory() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");
    stagehand(&temp)
        .args(["library", "ui", "--cwd", missing.to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Workspace not found"));
}

#[test]
fn missing_config_file_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    stagehand(&temp)
        .args(["--config", "absent.toml", "library", "ui"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn malformed_workspace_json_fails_without_writing() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("tsconfig.base.json"), "{ not json").unwrap();
    stagehand(&temp).args(["library", "ui"]).assert().failure();
    assert!(!temp.path().join("libs").exists());
}
