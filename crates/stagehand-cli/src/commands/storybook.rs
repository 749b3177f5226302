//! `stagehand storybook`: configure storybook for an existing project.

use tracing::instrument;

use stagehand_core::application::StorybookRequest;

use crate::cli::{GlobalArgs, StorybookArgs};
use crate::commands::Workspace;
use crate::config::AppConfig;
use crate::error::CliResult;
use crate::output::OutputManager;

#[instrument(skip_all, fields(project = %args.project))]
pub fn execute(args: StorybookArgs, global: GlobalArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let mut request = StorybookRequest::new(&args.project);
    request.qwik_city_support = args.qwik_city.into();
    request.skip_format = args.skip_format || config.defaults.skip_format;

    let workspace = Workspace::open(&global, &config, args.dry_run)?;
    let mut tree = workspace.tree();
    let plan = workspace.service().storybook(&mut tree, &request)?;
    workspace.finish(plan, &output)
}
