//! End-to-end runs of the `stagehand` binary against temporary workspaces.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn stagehand(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stagehand").unwrap();
    cmd.current_dir(workspace)
        .env_remove("RUST_LOG")
        .env_remove("STAGEHAND_TEMPLATES_DIR")
        .env("NO_COLOR", "1");
    cmd
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn help_lists_generators() {
    let temp = TempDir::new().unwrap();
    stagehand(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("library"))
        .stdout(predicate::str::contains("component"))
        .stdout(predicate::str::contains("storybook"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    stagehand(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn library_is_written_and_dependencies_recorded() {
    let temp = TempDir::new().unwrap();
    stagehand(temp.path())
        .args(["library", "my-lib", "--directory", "shared"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE libs/shared/my-lib/project.json"));

    let root = temp.path().join("libs/shared/my-lib");
    assert!(root.join("src/lib/my-lib.tsx").is_file());
    assert!(root.join("src/lib/my-lib.spec.tsx").is_file());
    assert!(!root.join("package.json").exists());

    let project = read_json(&root.join("project.json"));
    assert_eq!(project["name"], "shared-my-lib");
    assert_eq!(project["projectType"], "library");

    let index = fs::read_to_string(root.join("src/index.ts")).unwrap();
    assert_eq!(index, "export * from './lib/my-lib';\n");

    let manifest = read_json(&temp.path().join("package.json"));
    assert!(manifest["dependencies"]["@builder.io/qwik"].is_string());
    assert!(manifest["devDependencies"]["vitest"].is_string());
}

#[test]
fn dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    stagehand(temp.path())
        .args(["library", "my-lib", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE libs/my-lib/README.md"))
        .stdout(predicate::str::contains("would add dependency @builder.io/qwik"))
        .stdout(predicate::str::contains("Dry run"));

    assert!(!temp.path().join("libs").exists());
    assert!(!temp.path().join("package.json").exists());
}

#[test]
fn json_report_lists_changes() {
    let temp = TempDir::new().unwrap();
    let output = stagehand(temp.path())
        .args(["--output-format", "json", "library", "ui", "--dry-run", "--no-component"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dry_run"], true);
    let changes = report["changes"].as_array().unwrap();
    assert!(changes.iter().any(|c| c["path"] == "libs/ui/project.json" && c["kind"] == "create"));
    assert!(!changes.iter().any(|c| c["path"].as_str().unwrap().ends_with("ui.tsx")));
}

#[test]
fn second_run_builds_on_the_first() {
    let temp = TempDir::new().unwrap();
    stagehand(temp.path()).args(["library", "ui"]).assert().success();

    stagehand(temp.path())
        .args(["component", "PrimaryButton", "--project", "ui", "--style", "scss", "--stories"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UPDATE libs/ui/src/index.ts"));
    let dir = temp.path().join("libs/ui/src/lib/primary-button");
    assert!(dir.join("primary-button.tsx").is_file());
    assert!(dir.join("primary-button.scss").is_file());
    assert!(dir.join("primary-button.stories.tsx").is_file());

    stagehand(temp.path())
        .args(["storybook", "ui", "--qwik-city", "false"])
        .assert()
        .success();
    assert!(temp.path().join("libs/ui/.storybook/main.ts").is_file());
    let project = read_json(&temp.path().join("libs/ui/project.json"));
    assert!(project["targets"]["storybook"].is_object());
    assert!(project["targets"]["test"].is_object());
}

#[test]
fn completions_for_bash() {
    let temp = TempDir::new().unwrap();
    stagehand(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stagehand"));
}

#[test]
fn config_file_defaults_apply() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("stagehand.toml");
    fs::write(&config, "[defaults]\nlinter = \"none\"\nunit_test_runner = \"none\"\n").unwrap();

    stagehand(temp.path())
        .args(["--config", config.to_str().unwrap(), "library", "plain"])
        .assert()
        .success();

    let root = temp.path().join("libs/plain");
    assert!(!root.join(".eslintrc.json").exists());
    assert!(!root.join("tsconfig.spec.json").exists());
}

#[test]
fn configured_template_overlay_is_used() {
    let temp = TempDir::new().unwrap();
    let set = temp.path().join("templates/component");
    fs::create_dir_all(&set).unwrap();
    fs::write(
        set.join("__fileName__.tsx__tmpl__"),
        "// custom\nexport const {{className}} = () => null;\n",
    )
    .unwrap();
    let config = temp.path().join("stagehand.toml");
    fs::write(&config, "[templates]\nlocal_path = \"templates\"\n").unwrap();

    stagehand(temp.path())
        .args(["--config", config.to_str().unwrap(), "library", "ui"])
        .assert()
        .success();

    let component = fs::read_to_string(temp.path().join("libs/ui/src/lib/ui.tsx")).unwrap();
    assert!(component.starts_with("// custom"));
}
