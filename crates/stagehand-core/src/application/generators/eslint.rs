use serde_json::json;
use tracing::debug;

use crate::application::generators::GeneratorUnit;
use crate::application::scheduler::Task;
use crate::domain::workspace::{read_project_configuration, update_project_configuration};
use crate::domain::{NormalizedOptions, TargetConfiguration, WorkspaceTree, offset_from_root};
use crate::error::StagehandResult;

pub const ROOT_ESLINT_CONFIG: &str = ".eslintrc.json";
pub const ESLINT_EXECUTOR: &str = "@nx/eslint:lint";

/// Lint configuration for the project plus a `lint` target.
///
/// Package requirements are recorded by the common dependency unit, so
/// this unit has no deferred work.
pub struct EslintUnit;

impl GeneratorUnit for EslintUnit {
    fn name(&self) -> &'static str {
        "configure-eslint"
    }

    fn apply(&self, tree: &mut WorkspaceTree, options: &NormalizedOptions) -> StagehandResult<Vec<Task>> {
        let root = options.project_root.as_str();

        if !tree.exists(ROOT_ESLINT_CONFIG)? {
            debug!("creating root eslint config");
            tree.write_json(
                ROOT_ESLINT_CONFIG,
                &json!({
                    "root": true,
                    "ignorePatterns": ["**/*"],
                    "plugins": ["@nx"],
                    "overrides": [
                        {
                            "files": ["*.ts", "*.tsx", "*.js", "*.jsx"],
                            "rules": {}
                        }
                    ]
                }),
            )?;
        }

        tree.write_json(
            &format!("{root}/{ROOT_ESLINT_CONFIG}"),
            &json!({
                "extends": [
                    "plugin:qwik/recommended",
                    format!("{}{ROOT_ESLINT_CONFIG}", offset_from_root(root)),
                ],
                "ignorePatterns": ["!**/*"],
                "overrides": [
                    {
                        "files": ["*.ts", "*.tsx", "*.js", "*.jsx"],
                        "parserOptions": {
                            "project": [format!("{root}/tsconfig.*?.json")]
                        },
                        "rules": {}
                    }
                ]
            }),
        )?;

        let mut config = read_project_configuration(tree, &options.project_name)?;
        config.merge_targets([(
            "lint".to_string(),
            TargetConfiguration::new(ESLINT_EXECUTOR)
                .with_output("{options.outputFile}")
                .with_option("lintFilePatterns", json!([format!("{root}/**/*.{{ts,tsx,js,jsx}}")])),
        )]);
        update_project_configuration(tree, &config)?;

        Ok(Vec::new())
    }
}
