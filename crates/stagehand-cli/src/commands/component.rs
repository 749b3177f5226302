//! `stagehand component`: add a component to an existing project.

use tracing::instrument;

use stagehand_core::application::ComponentRequest;

use crate::cli::{ComponentArgs, GlobalArgs};
use crate::commands::Workspace;
use crate::config::AppConfig;
use crate::error::CliResult;
use crate::output::OutputManager;

#[instrument(skip_all, fields(component = %args.name, project = %args.project))]
pub fn execute(args: ComponentArgs, global: GlobalArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let request = build_request(&args, &config);
    let workspace = Workspace::open(&global, &config, args.dry_run)?;
    let mut tree = workspace.tree();
    let plan = workspace.service().component(&mut tree, &request)?;
    workspace.finish(plan, &output)
}

pub fn build_request(args: &ComponentArgs, config: &AppConfig) -> ComponentRequest {
    let mut request = ComponentRequest::new(&args.name, &args.project);
    request.directory = args.directory.clone();
    if let Some(style) = args.style.map(Into::into).or(config.defaults.style) {
        request.style = style;
    }
    request.skip_tests = args.skip_tests;
    request.generate_stories = args.stories;
    request.flat = args.flat;
    request.export = !args.no_export;
    request.skip_format = args.skip_format || config.defaults.skip_format;
    request
}
