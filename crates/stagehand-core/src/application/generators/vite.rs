use serde_json::json;

use crate::application::generators::GeneratorUnit;
use crate::application::scheduler::Task;
use crate::domain::workspace::{read_project_configuration, update_project_configuration};
use crate::domain::{NormalizedOptions, TargetConfiguration, WorkspaceTree, offset_from_root};
use crate::error::StagehandResult;

pub const VITE_BUILD_EXECUTOR: &str = "@nx/vite:build";
pub const VITE_TEST_EXECUTOR: &str = "@nx/vite:test";

/// Merges the `build` and `test` targets into the library's record.
pub struct ViteUnit;

impl GeneratorUnit for ViteUnit {
    fn name(&self) -> &'static str {
        "configure-vite"
    }

    fn apply(&self, tree: &mut WorkspaceTree, options: &NormalizedOptions) -> StagehandResult<Vec<Task>> {
        let mut config = read_project_configuration(tree, &options.project_name)?;
        config.merge_targets(library_targets(options));
        update_project_configuration(tree, &config)?;
        Ok(Vec::new())
    }
}

/// Targets a Qwik library needs, depending on buildability and tests.
pub fn library_targets(options: &NormalizedOptions) -> Vec<(String, TargetConfiguration)> {
    let root = options.project_root.as_str();
    let mut targets = Vec::new();

    if options.buildable {
        targets.push((
            "build".to_string(),
            TargetConfiguration::new(VITE_BUILD_EXECUTOR)
                .with_output("{options.outputPath}")
                .with_option("outputPath", format!("dist/{root}"))
                .with_option("configFile", format!("{root}/vite.config.ts"))
                .with_option("mode", "lib"),
        ));
    }

    if options.setup_vitest() {
        targets.push((
            "test".to_string(),
            TargetConfiguration::new(VITE_TEST_EXECUTOR)
                .with_output(format!("{{workspaceRoot}}/coverage/{root}"))
                .with_option("passWithNoTests", json!(true))
                .with_option("reportsDirectory", format!("{}coverage/{root}", offset_from_root(root))),
        ));
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LibraryRequest, UnitTestRunner, normalize_library_options};

    fn options(buildable: bool, runner: UnitTestRunner) -> NormalizedOptions {
        let mut request = LibraryRequest::new("a");
        request.buildable = Some(buildable);
        request.unit_test_runner = Some(runner);
        normalize_library_options(&WorkspaceTree::new(), &request).unwrap()
    }

    #[test]
    fn targets_follow_flags() {
        let names = |o: &NormalizedOptions| library_targets(o).into_iter().map(|(n, _)| n).collect::<Vec<_>>();
        assert_eq!(names(&options(true, UnitTestRunner::Vitest)), vec!["build", "test"]);
        assert_eq!(names(&options(false, UnitTestRunner::Vitest)), vec!["test"]);
        assert!(names(&options(false, UnitTestRunner::None)).is_empty());
    }

    #[test]
    fn test_target_reports_under_workspace_coverage() {
        let targets = library_targets(&options(false, UnitTestRunner::Vitest));
        let test = &targets[0].1;
        assert_eq!(test.outputs(), ["{workspaceRoot}/coverage/libs/a"]);
        assert_eq!(test.option("reportsDirectory"), Some(&json!("../../coverage/libs/a")));
    }
}
