//! End-to-end scaffolding against the built-in templates and in-memory
//! storage.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use stagehand_adapters::{InMemoryStore, MemoryFilesystem, RecordingRegistry, WhitespaceFormatter};
use stagehand_core::{
    application::{
        ApplicationError, ComponentRequest, Plan, ScaffoldService, StorybookRequest, Task, run_tasks_in_serial,
    },
    domain::{
        ChangeKind, DomainError, FileChange, LibraryRequest, Linter, QwikCitySupport, Style, TemplateContext,
        TemplateFile, TemplateSet, WorkspacePath, WorkspaceTree, generate_files,
    },
    error::{StagehandError, StagehandResult},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

struct Harness {
    service: ScaffoldService,
    registry: RecordingRegistry,
}

fn harness() -> Harness {
    let registry = RecordingRegistry::new();
    let service = ScaffoldService::new(
        Arc::new(InMemoryStore::with_builtin().unwrap()),
        Arc::new(registry.clone()),
        Arc::new(WhitespaceFormatter),
    );
    Harness { service, registry }
}

fn tree_over(fs: &MemoryFilesystem) -> WorkspaceTree {
    WorkspaceTree::with_backing(Arc::new(fs.clone()))
}

fn example_request() -> LibraryRequest {
    let mut request = LibraryRequest::new("my-lib");
    request.directory = Some("shared".into());
    request.linter = Some(Linter::EsLint);
    request.strict = Some(true);
    request.generate_component = Some(true);
    request.style = Some(Style::Css);
    request
}

fn paths(changes: &[FileChange]) -> Vec<&str> {
    changes.iter().map(|c| c.path.as_str()).collect()
}

fn content<'a>(changes: &'a [FileChange], path: &str) -> &'a str {
    changes
        .iter()
        .find(|c| c.path.as_str() == path)
        .and_then(|c| c.content.as_deref())
        .map(|bytes| std::str::from_utf8(bytes).unwrap())
        .unwrap_or_else(|| panic!("{path} not staged"))
}

// ── Example scenario ─────────────────────────────────────────────────────────

#[test]
fn example_library_stages_expected_files_and_registers_once() {
    let h = harness();
    let fs = MemoryFilesystem::new();
    let mut tree = tree_over(&fs);

    let plan = h.service.library(&mut tree, &example_request()).unwrap();
    let staged = paths(&plan.changes);

    let root = "libs/shared/my-lib";
    for expected in [
        "libs/shared/my-lib/project.json",
        "libs/shared/my-lib/README.md",
        "libs/shared/my-lib/src/index.ts",
        "libs/shared/my-lib/src/root.tsx",
        "libs/shared/my-lib/src/lib/my-lib.tsx",
        "libs/shared/my-lib/src/lib/my-lib.css",
        "libs/shared/my-lib/src/lib/my-lib.spec.tsx",
        "libs/shared/my-lib/.eslintrc.json",
        "libs/shared/my-lib/tsconfig.spec.json",
        ".eslintrc.json",
        "tsconfig.base.json",
    ] {
        assert!(staged.contains(&expected), "missing {expected} in {staged:?}");
    }
    assert!(!staged.iter().any(|p| p.contains(".storybook") || p.contains("stories")));
    assert!(!staged.contains(&"libs/shared/my-lib/package.json"));
    assert!(plan.changes.iter().all(|c| c.kind == ChangeKind::Create));

    let project: Value = serde_json::from_str(content(&plan.changes, &format!("{root}/project.json"))).unwrap();
    assert_eq!(project["name"], "shared-my-lib");
    assert_eq!(project["targets"]["lint"]["executor"], "@nx/eslint:lint");
    assert_eq!(project["targets"]["test"]["executor"], "@nx/vite:test");
    assert!(project["targets"].get("build").is_none());

    let base: Value = serde_json::from_str(content(&plan.changes, "tsconfig.base.json")).unwrap();
    assert_eq!(
        base["compilerOptions"]["paths"]["shared/my-lib"],
        json!(["libs/shared/my-lib/src/index.ts"])
    );
    assert_eq!(
        content(&plan.changes, "libs/shared/my-lib/src/index.ts"),
        "export * from './lib/my-lib';\n"
    );
    assert!(content(&plan.changes, "libs/shared/my-lib/src/lib/my-lib.tsx").contains("export const MyLib"));

    assert!(h.registry.sets().is_empty(), "nothing registered while planning");
    h.service.commit(plan, &fs).unwrap();

    let sets = h.registry.sets();
    assert_eq!(sets.len(), 1);
    assert!(sets[0].dependencies.contains_key("@builder.io/qwik"));
    assert_eq!(sets[0].dependencies.len(), 1);
    assert!(fs.read_file("libs/shared/my-lib/src/lib/my-lib.tsx").is_some());
}

// ── Determinism ──────────────────────────────────────────────────────────────

#[test]
fn identical_runs_stage_identical_trees() {
    let run = || {
        let h = harness();
        let mut tree = WorkspaceTree::new();
        let mut request = example_request();
        request.storybook_configuration = Some(true);
        request.buildable = Some(true);
        h.service.library(&mut tree, &request).unwrap().changes
    };
    assert_eq!(run(), run());
}

// ── Optional units ───────────────────────────────────────────────────────────

#[test]
fn declined_component_leaves_no_component_files() {
    let h = harness();
    let mut tree = WorkspaceTree::new();
    let mut request = LibraryRequest::new("plain");
    request.generate_component = Some(false);

    let plan = h.service.library(&mut tree, &request).unwrap();
    assert!(!paths(&plan.changes).iter().any(|p| p.contains("/src/lib/")));
    assert_eq!(content(&plan.changes, "libs/plain/src/index.ts"), "");
}

#[test]
fn declined_tests_remove_spec_config_staged_by_the_template() {
    let h = harness();
    let mut tree = WorkspaceTree::new();
    let mut request = LibraryRequest::new("no-tests");
    request.unit_test_runner = Some(stagehand_core::domain::UnitTestRunner::None);

    let plan = h.service.library(&mut tree, &request).unwrap();
    let staged = paths(&plan.changes);
    assert!(!staged.contains(&"libs/no-tests/tsconfig.spec.json"));
    assert!(!staged.contains(&"libs/no-tests/vite.config.ts"));
    assert!(!staged.iter().any(|p| p.ends_with(".spec.tsx")));
    assert!(!content(&plan.changes, "libs/no-tests/tsconfig.json").contains("tsconfig.spec.json"));
}

#[test]
fn stories_follow_storybook_and_component() {
    let h = harness();
    let mut tree = WorkspaceTree::new();
    let mut request = LibraryRequest::new("ui");
    request.storybook_configuration = Some(true);

    let plan = h.service.library(&mut tree, &request).unwrap();
    let staged = paths(&plan.changes);
    assert!(staged.contains(&"libs/ui/.storybook/main.ts"));
    assert!(staged.contains(&"libs/ui/src/lib/ui.stories.tsx"));

    let lib: Value = serde_json::from_str(content(&plan.changes, "libs/ui/tsconfig.lib.json")).unwrap();
    assert!(lib["exclude"].as_array().unwrap().contains(&json!(".storybook/**/*")));

    h.service.commit(plan, &MemoryFilesystem::new()).unwrap();
    assert_eq!(h.registry.sets().len(), 2);
}

#[test]
fn stories_with_storybook_explicitly_off_is_rejected() {
    let h = harness();
    let mut tree = WorkspaceTree::new();
    let mut request = LibraryRequest::new("ui");
    request.storybook_configuration = Some(false);
    request.generate_stories = Some(true);

    let err = h.service.library(&mut tree, &request).unwrap_err();
    assert!(matches!(err, StagehandError::Domain(DomainError::ConflictingOptions { .. })));
    assert!(tree.list_changes().is_empty());
}

// ── Storybook qwik-city modes ────────────────────────────────────────────────

fn preview_for(support: QwikCitySupport) -> String {
    let h = harness();
    let mut tree = WorkspaceTree::new();
    let mut library = LibraryRequest::new("ui");
    library.generate_component = Some(false);
    h.service.library(&mut tree, &library).unwrap();

    let mut request = StorybookRequest::new("ui");
    request.qwik_city_support = support;
    let plan = h.service.storybook(&mut tree, &request).unwrap();
    content(&plan.changes, "libs/ui/.storybook/preview.ts").to_string()
}

#[test]
fn qwik_city_modes_yield_distinct_deterministic_previews() {
    let on = preview_for(QwikCitySupport::True);
    let off = preview_for(QwikCitySupport::False);
    let auto = preview_for(QwikCitySupport::Auto);

    assert_ne!(on, off);
    assert_ne!(on, auto);
    assert_ne!(off, auto);
    assert_eq!(auto, preview_for(QwikCitySupport::Auto));

    assert!(on.contains("qwikCityDecorator"));
    assert!(!off.contains("qwikCityDecorator"));
    assert!(auto.starts_with("// qwik-city support: auto (no qwik-city usage found)"));
}

// ── Structural merge ─────────────────────────────────────────────────────────

#[test]
fn storybook_keeps_unrelated_targets() {
    let fs = MemoryFilesystem::new()
        .with_file(
            "apps/shop/project.json",
            serde_json::to_vec(&json!({
                "name": "shop",
                "projectType": "application",
                "sourceRoot": "apps/shop/src",
                "targets": {
                    "deploy": {"executor": "acme:deploy", "options": {"region": "eu"}},
                    "build": {"executor": "x:y"},
                    "echo": {"command": "echo hi"},
                    "pack": {"executor": "acme:pack", "outputs": [], "configurations": {}},
                    "storybook": {"executor": "@nx/storybook:storybook", "options": {"port": 6006}}
                },
                "implicitDependencies": ["api"]
            }))
            .unwrap(),
        )
        .unwrap()
        .with_file("apps/shop/tsconfig.json", r#"{"references": []}"#)
        .unwrap();

    let h = harness();
    let mut tree = tree_over(&fs);
    let plan = h.service.storybook(&mut tree, &StorybookRequest::new("shop")).unwrap();

    let change = plan
        .changes
        .iter()
        .find(|c| c.path.as_str() == "apps/shop/project.json")
        .unwrap();
    assert_eq!(change.kind, ChangeKind::Update);

    let project: Value = serde_json::from_str(content(&plan.changes, "apps/shop/project.json")).unwrap();
    assert_eq!(
        project["targets"]["deploy"],
        json!({"executor": "acme:deploy", "options": {"region": "eu"}})
    );
    assert_eq!(project["targets"]["build"], json!({"executor": "x:y"}));
    assert_eq!(project["targets"]["echo"], json!({"command": "echo hi"}));
    assert_eq!(
        project["targets"]["pack"],
        json!({"executor": "acme:pack", "outputs": [], "configurations": {}})
    );
    assert_eq!(project["targets"]["storybook"]["options"]["port"], 4400);
    assert_eq!(project["targets"]["storybook"]["options"]["configDir"], "apps/shop/.storybook");
    assert_eq!(project["implicitDependencies"], json!(["api"]));

    let preview = content(&plan.changes, "apps/shop/.storybook/preview.ts");
    assert!(preview.contains("application project"));
    assert!(preview.contains("qwikCityDecorator"));

    let tsconfig: Value = serde_json::from_str(content(&plan.changes, "apps/shop/tsconfig.json")).unwrap();
    assert_eq!(tsconfig["references"], json!([{"path": "./tsconfig.storybook.json"}]));
}

#[test]
fn storybook_twice_is_rejected() {
    let h = harness();
    let mut tree = WorkspaceTree::new();
    h.service.library(&mut tree, &LibraryRequest::new("ui")).unwrap();
    h.service.storybook(&mut tree, &StorybookRequest::new("ui")).unwrap();

    let err = h.service.storybook(&mut tree, &StorybookRequest::new("ui")).unwrap_err();
    assert!(matches!(err, StagehandError::Domain(DomainError::FileExists { .. })));
}

// ── Standalone component ─────────────────────────────────────────────────────

#[test]
fn component_in_existing_project() {
    let h = harness();
    let mut tree = WorkspaceTree::new();
    let mut library = LibraryRequest::new("ui");
    library.generate_component = Some(false);
    h.service.library(&mut tree, &library).unwrap();

    let mut request = ComponentRequest::new("PrimaryButton", "ui");
    request.style = Style::Scss;
    request.generate_stories = true;
    let plan = h.service.component(&mut tree, &request).unwrap();
    let staged = paths(&plan.changes);

    assert!(staged.contains(&"libs/ui/src/lib/primary-button/primary-button.tsx"));
    assert!(staged.contains(&"libs/ui/src/lib/primary-button/primary-button.scss"));
    assert!(staged.contains(&"libs/ui/src/lib/primary-button/primary-button.stories.tsx"));
    assert!(
        content(&plan.changes, "libs/ui/src/lib/primary-button/primary-button.tsx")
            .contains("import styles from './primary-button.scss?inline';")
    );
    assert_eq!(
        content(&plan.changes, "libs/ui/src/index.ts"),
        "export * from './lib/primary-button/primary-button';\n"
    );

    let err = h.service.component(&mut tree, &request).unwrap_err();
    assert!(matches!(err, StagehandError::Domain(DomainError::FileExists { .. })));
}

#[test]
fn component_for_unknown_project_is_a_validation_error() {
    let h = harness();
    let mut tree = WorkspaceTree::new();
    let err = h
        .service
        .component(&mut tree, &ComponentRequest::new("x", "ghost"))
        .unwrap_err();
    assert!(matches!(err, StagehandError::Domain(DomainError::Validation { .. })));
}

// ── Fail-fast ────────────────────────────────────────────────────────────────

#[test]
fn third_of_five_tasks_failing_stops_the_rest() {
    let ran = Arc::new(Mutex::new(Vec::new()));
    let tasks: Vec<Task> = (1..=5)
        .map(|i| {
            let ran = Arc::clone(&ran);
            Task::new(format!("task-{i}"), move || -> StagehandResult<()> {
                ran.lock().unwrap().push(i);
                if i == 3 {
                    return Err(ApplicationError::DependencyRegistration { reason: "boom".into() }.into());
                }
                Ok(())
            })
        })
        .collect();

    let err = run_tasks_in_serial("all", tasks).run().unwrap_err();
    assert_eq!(*ran.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(err.failing_steps(), vec![(3, "task-3")]);
    assert!(matches!(
        err.root_cause(),
        StagehandError::Application(ApplicationError::DependencyRegistration { .. })
    ));
}

#[test]
fn failing_commit_runs_no_task() {
    struct Broken;
    impl stagehand_core::application::WorkspaceWriter for Broken {
        fn commit(&self, _changes: &[FileChange]) -> StagehandResult<()> {
            Err(ApplicationError::FilesystemError {
                path: "x".into(),
                reason: "read-only".into(),
            }
            .into())
        }
    }

    let h = harness();
    let mut tree = WorkspaceTree::new();
    let plan = h.service.library(&mut tree, &LibraryRequest::new("a")).unwrap();
    assert!(h.service.commit(plan, &Broken).is_err());
    assert!(h.registry.sets().is_empty());
}

// ── Boundary ─────────────────────────────────────────────────────────────────

#[test]
fn escaping_template_path_is_rejected_before_any_write() {
    let set = TemplateSet::new(
        "evil",
        vec![
            TemplateFile::literal("ok.txt", "fine"),
            TemplateFile::literal("__fileName__/../../../escape.txt", "nope"),
        ],
    );
    let root = WorkspacePath::parse("libs/a").unwrap();
    let context = TemplateContext::new().with("fileName", "x");
    let mut tree = WorkspaceTree::new();

    let err = generate_files(&mut tree, &set, &root, &context).unwrap_err();
    assert!(matches!(err, DomainError::BoundaryViolation { .. }));
    assert!(tree.list_changes().is_empty());
}

#[test]
fn escaping_library_directory_is_rejected() {
    let h = harness();
    let mut tree = WorkspaceTree::new();
    let mut request = LibraryRequest::new("x");
    request.directory = Some("../outside".into());
    assert!(h.service.library(&mut tree, &request).is_err());
    assert!(tree.list_changes().is_empty());
}

#[test]
fn storybook_finds_record_without_project_type() {
    let fs = MemoryFilesystem::new()
        .with_file(
            "libs/ui/project.json",
            serde_json::to_vec(&json!({
                "name": "ui",
                "targets": {"echo": {"command": "echo hi"}}
            }))
            .unwrap(),
        )
        .unwrap();

    let h = harness();
    let mut tree = tree_over(&fs);
    let plan = h.service.storybook(&mut tree, &StorybookRequest::new("ui")).unwrap();

    let project: Value = serde_json::from_str(content(&plan.changes, "libs/ui/project.json")).unwrap();
    assert_eq!(project["targets"]["echo"], json!({"command": "echo hi"}));
    assert_eq!(project["targets"]["storybook"]["executor"], "@nx/storybook:storybook");
    assert!(project.get("projectType").is_none());
}

#[test]
fn mapped_import_path_fails_before_any_write() {
    let fs = MemoryFilesystem::new()
        .with_file(
            "tsconfig.base.json",
            r#"{"compilerOptions": {"paths": {"my-lib": ["libs/other/src/index.ts"]}}}"#,
        )
        .unwrap();

    let h = harness();
    let mut tree = tree_over(&fs);
    let err = h.service.library(&mut tree, &LibraryRequest::new("my-lib")).unwrap_err();

    assert!(matches!(err, StagehandError::Domain(DomainError::ImportPathInUse { .. })));
    assert!(err.failing_steps().is_empty());
    assert!(tree.change_log().is_empty());
}

// ── Commit ───────────────────────────────────────────────────────────────────

#[test]
fn rewritten_file_survives_directory_delete_on_commit() {
    let fs = MemoryFilesystem::new()
        .with_file("libs/a/x.ts", "x")
        .unwrap()
        .with_file("libs/a/y.ts", "y")
        .unwrap();
    let mut tree = tree_over(&fs);
    tree.delete("libs/a").unwrap();
    tree.write("libs/a/x.ts", "x").unwrap();
    assert!(tree.exists("libs/a/x.ts").unwrap());

    let h = harness();
    let plan = Plan {
        changes: tree.list_changes(),
        task: Task::noop("none"),
    };
    h.service.commit(plan, &fs).unwrap();

    assert_eq!(fs.read_file("libs/a/x.ts").as_deref(), Some("x"));
    assert_eq!(fs.read_file("libs/a/y.ts"), None);
}

#[test]
fn second_run_sees_committed_workspace() {
    let h = harness();
    let fs = MemoryFilesystem::new();

    let mut first = tree_over(&fs);
    let plan = h.service.library(&mut first, &LibraryRequest::new("a")).unwrap();
    h.service.commit(plan, &fs).unwrap();

    let mut second = tree_over(&fs);
    let err = h.service.library(&mut second, &LibraryRequest::new("a")).unwrap_err();
    assert!(matches!(err, StagehandError::Domain(DomainError::ProjectExists { .. })));

    let plan = h.service.library(&mut second, &LibraryRequest::new("b")).unwrap();
    let base: Vec<&FileChange> = plan
        .changes
        .iter()
        .filter(|c| c.path.as_str() == "tsconfig.base.json")
        .collect();
    assert_eq!(base.len(), 1);
    assert_eq!(base[0].kind, ChangeKind::Update);
}
