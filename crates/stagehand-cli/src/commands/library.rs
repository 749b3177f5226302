//! Implementation of the `stagehand library` command.
//!
//! Responsibility: fold configured defaults into a `LibraryRequest`, plan
//! it, and hand the plan to [`Workspace::finish`]. No business logic lives
//! here.

use tracing::{debug, instrument};

use stagehand_core::domain::LibraryRequest;

use crate::cli::{GlobalArgs, LibraryArgs};
use crate::commands::Workspace;
use crate::config::AppConfig;
use crate::error::CliResult;
use crate::output::OutputManager;

#[instrument(skip_all, fields(library = %args.name))]
pub fn execute(args: LibraryArgs, global: GlobalArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let request = build_request(&args, &config);
    debug!(?request, "library request");

    let workspace = Workspace::open(&global, &config, args.dry_run)?;
    let mut tree = workspace.tree();
    let plan = workspace.service().library(&mut tree, &request)?;
    workspace.finish(plan, &output)?;

    if !args.dry_run {
        output.print("")?;
        output.print("Next steps:")?;
        output.print("  npm install")?;
    }
    Ok(())
}

/// Flags win over configured defaults; anything left unset is decided by
/// the normalizer.
pub fn build_request(args: &LibraryArgs, config: &AppConfig) -> LibraryRequest {
    let defaults = &config.defaults;
    LibraryRequest {
        name: args.name.clone(),
        directory: args.directory.clone(),
        tags: args.tags.clone(),
        style: args.style.map(Into::into).or(defaults.style),
        linter: args.linter.map(Into::into).or(defaults.linter),
        strict: if args.no_strict { Some(false) } else { defaults.strict },
        unit_test_runner: args.unit_test_runner.map(Into::into).or(defaults.unit_test_runner),
        generate_component: args.no_component.then_some(false),
        generate_stories: args.stories.then_some(true),
        storybook_configuration: args.storybook.then_some(true),
        buildable: args.buildable.then_some(true),
        import_path: args.import_path.clone(),
        project_name_and_root_format: args
            .format
            .map(Into::into)
            .or(defaults.project_name_and_root_format),
        skip_format: (args.skip_format || defaults.skip_format).then_some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use stagehand_core::domain::{Linter, ProjectNameAndRootFormat, Style};

    use crate::cli::{Cli, Commands};

    fn args(argv: &[&str]) -> LibraryArgs {
        let mut full = vec!["stagehand", "library"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Library(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn absent_flags_stay_unset() {
        let request = build_request(&args(&["my-lib"]), &AppConfig::default());
        assert_eq!(request, LibraryRequest::new("my-lib"));
    }

    #[test]
    fn flags_map_onto_the_request() {
        let request = build_request(
            &args(&[
                "my-lib",
                "--no-strict",
                "--no-component",
                "--stories",
                "--storybook",
                "--buildable",
                "--tags",
                "a,b",
            ]),
            &AppConfig::default(),
        );
        assert_eq!(request.strict, Some(false));
        assert_eq!(request.generate_component, Some(false));
        assert_eq!(request.generate_stories, Some(true));
        assert_eq!(request.storybook_configuration, Some(true));
        assert_eq!(request.buildable, Some(true));
        assert_eq!(request.tags.as_deref(), Some("a,b"));
    }

    #[test]
    fn config_defaults_fill_gaps_but_flags_win() {
        let mut config = AppConfig::default();
        config.defaults.linter = Some(Linter::None);
        config.defaults.style = Some(Style::Less);
        config.defaults.project_name_and_root_format = Some(ProjectNameAndRootFormat::AsProvided);
        config.defaults.skip_format = true;

        let request = build_request(&args(&["my-lib", "--style", "scss"]), &config);
        assert_eq!(request.linter, Some(Linter::None));
        assert_eq!(request.style, Some(Style::Scss));
        assert_eq!(request.project_name_and_root_format, Some(ProjectNameAndRootFormat::AsProvided));
        assert_eq!(request.skip_format, Some(true));
    }
}
