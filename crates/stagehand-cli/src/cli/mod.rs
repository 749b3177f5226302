//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

use stagehand_core::domain::{Linter, ProjectNameAndRootFormat, QwikCitySupport, Style, UnitTestRunner};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stagehand",
    bin_name = "stagehand",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Staged scaffolding for Qwik libraries",
    long_about = "Stagehand plans every edit in memory, shows the change list, \
                  and only then writes it to the workspace.",
    after_help = "EXAMPLES:\n\
        \x20 stagehand library my-lib --directory shared --storybook\n\
        \x20 stagehand component Button --project shared-my-lib --style scss\n\
        \x20 stagehand storybook shared-my-lib --qwik-city auto\n\
        \x20 stagehand completions bash > /usr/share/bash-completion/completions/stagehand",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new Qwik library.
    #[command(
        visible_alias = "lib",
        about = "Create a new library",
        after_help = "EXAMPLES:\n\
            \x20 stagehand library my-lib\n\
            \x20 stagehand library my-lib --directory shared --buildable\n\
            \x20 stagehand library my-lib --storybook --stories --dry-run"
    )]
    Library(LibraryArgs),

    /// Add a component to an existing project.
    #[command(
        visible_alias = "c",
        about = "Add a component",
        after_help = "EXAMPLES:\n\
            \x20 stagehand component Button --project my-lib\n\
            \x20 stagehand component Card --project my-lib --style scss --stories"
    )]
    Component(ComponentArgs),

    /// Configure storybook for an existing project.
    #[command(
        about = "Configure storybook",
        after_help = "EXAMPLES:\n\
            \x20 stagehand storybook my-lib\n\
            \x20 stagehand storybook my-app --qwik-city true"
    )]
    Storybook(StorybookArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stagehand completions bash > ~/.local/share/bash-completion/completions/stagehand\n\
            \x20 stagehand completions zsh  > ~/.zfunc/_stagehand\n\
            \x20 stagehand completions fish > ~/.config/fish/completions/stagehand.fish"
    )]
    Completions(CompletionsArgs),
}

// ── library ───────────────────────────────────────────────────────────────────

/// Arguments for `stagehand library`.
#[derive(Debug, Args)]
pub struct LibraryArgs {
    /// Library name; `/` separates nested segments.
    #[arg(value_name = "NAME", help = "Library name")]
    pub name: String,

    #[arg(
        short = 'd',
        long = "directory",
        value_name = "DIR",
        help = "Directory the library is placed in"
    )]
    pub directory: Option<String>,

    #[arg(
        long = "tags",
        value_name = "TAGS",
        help = "Comma separated project tags"
    )]
    pub tags: Option<String>,

    #[arg(short = 's', long = "style", value_enum, help = "Component style")]
    pub style: Option<StyleArg>,

    #[arg(long = "linter", value_enum, help = "Linter to configure")]
    pub linter: Option<LinterArg>,

    #[arg(long = "no-strict", help = "Disable strict TypeScript settings")]
    pub no_strict: bool,

    #[arg(long = "unit-test-runner", value_enum, help = "Unit test runner")]
    pub unit_test_runner: Option<TestRunnerArg>,

    #[arg(long = "no-component", help = "Do not generate a component")]
    pub no_component: bool,

    #[arg(long = "stories", help = "Generate stories for the component")]
    pub stories: bool,

    #[arg(long = "storybook", help = "Configure storybook")]
    pub storybook: bool,

    #[arg(long = "buildable", help = "Add a build target")]
    pub buildable: bool,

    #[arg(
        long = "import-path",
        value_name = "PATH",
        help = "Import path used to reference the library"
    )]
    pub import_path: Option<String>,

    /// How the project name and root are derived.
    #[arg(long = "format", value_enum, help = "Project name and root format")]
    pub format: Option<FormatArg>,

    #[arg(long = "skip-format", help = "Do not format the generated files")]
    pub skip_format: bool,

    /// Preview the change list without writing any files.
    #[arg(long = "dry-run", help = "Show what would change without writing")]
    pub dry_run: bool,
}

// ── component ─────────────────────────────────────────────────────────────────

/// Arguments for `stagehand component`.
#[derive(Debug, Args)]
pub struct ComponentArgs {
    #[arg(value_name = "NAME", help = "Component name")]
    pub name: String,

    #[arg(
        short = 'p',
        long = "project",
        value_name = "PROJECT",
        help = "Project that receives the component"
    )]
    pub project: String,

    #[arg(
        short = 'd',
        long = "directory",
        value_name = "DIR",
        help = "Directory below the project's source root (default: lib)"
    )]
    pub directory: Option<String>,

    #[arg(short = 's', long = "style", value_enum, help = "Component style")]
    pub style: Option<StyleArg>,

    #[arg(long = "skip-tests", help = "Do not generate a spec file")]
    pub skip_tests: bool,

    #[arg(long = "stories", help = "Generate a stories file")]
    pub stories: bool,

    #[arg(long = "flat", help = "Do not create a directory for the component")]
    pub flat: bool,

    #[arg(long = "no-export", help = "Do not export the component from the index")]
    pub no_export: bool,

    #[arg(long = "skip-format", help = "Do not format the generated files")]
    pub skip_format: bool,

    #[arg(long = "dry-run", help = "Show what would change without writing")]
    pub dry_run: bool,
}

// ── storybook ─────────────────────────────────────────────────────────────────

/// Arguments for `stagehand storybook`.
#[derive(Debug, Args)]
pub struct StorybookArgs {
    #[arg(value_name = "PROJECT", help = "Project to configure")]
    pub project: String,

    #[arg(
        long = "qwik-city",
        value_enum,
        default_value = "auto",
        help = "Wrap stories in the qwik-city decorator"
    )]
    pub qwik_city: QwikCityArg,

    #[arg(long = "skip-format", help = "Do not format the generated files")]
    pub skip_format: bool,

    #[arg(long = "dry-run", help = "Show what would change without writing")]
    pub dry_run: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stagehand completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── value enums ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum StyleArg {
    Css,
    Scss,
    Less,
    Styl,
    None,
}

impl From<StyleArg> for Style {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Css => Style::Css,
            StyleArg::Scss => Style::Scss,
            StyleArg::Less => Style::Less,
            StyleArg::Styl => Style::Styl,
            StyleArg::None => Style::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LinterArg {
    #[value(alias = "es-lint")]
    Eslint,
    None,
}

impl From<LinterArg> for Linter {
    fn from(arg: LinterArg) -> Self {
        match arg {
            LinterArg::Eslint => Linter::EsLint,
            LinterArg::None => Linter::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum TestRunnerArg {
    Vitest,
    None,
}

impl From<TestRunnerArg> for UnitTestRunner {
    fn from(arg: TestRunnerArg) -> Self {
        match arg {
            TestRunnerArg::Vitest => UnitTestRunner::Vitest,
            TestRunnerArg::None => UnitTestRunner::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum FormatArg {
    Derived,
    AsProvided,
}

impl From<FormatArg> for ProjectNameAndRootFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Derived => ProjectNameAndRootFormat::Derived,
            FormatArg::AsProvided => ProjectNameAndRootFormat::AsProvided,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum QwikCityArg {
    True,
    False,
    Auto,
}

impl From<QwikCityArg> for QwikCitySupport {
    fn from(arg: QwikCityArg) -> Self {
        match arg {
            QwikCityArg::True => QwikCitySupport::True,
            QwikCityArg::False => QwikCitySupport::False,
            QwikCityArg::Auto => QwikCitySupport::Auto,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_library_command() {
        let cli = Cli::parse_from([
            "stagehand",
            "library",
            "my-lib",
            "--directory",
            "shared",
            "--storybook",
            "--style",
            "scss",
        ]);
        let Commands::Library(args) = cli.command else {
            panic!("expected library command");
        };
        assert_eq!(args.name, "my-lib");
        assert_eq!(args.directory.as_deref(), Some("shared"));
        assert!(args.storybook);
        assert_eq!(args.style, Some(StyleArg::Scss));
        assert_eq!(args.format, None);
    }

    #[test]
    fn library_alias_and_format() {
        let cli = Cli::parse_from(["stagehand", "lib", "a", "--format", "as-provided"]);
        let Commands::Library(args) = cli.command else {
            panic!("expected library command");
        };
        assert_eq!(args.format.map(ProjectNameAndRootFormat::from), Some(ProjectNameAndRootFormat::AsProvided));
    }

    #[test]
    fn component_requires_project() {
        assert!(Cli::try_parse_from(["stagehand", "component", "Button"]).is_err());
        let cli = Cli::parse_from(["stagehand", "component", "Button", "-p", "ui", "--flat"]);
        assert!(matches!(cli.command, Commands::Component(ComponentArgs { flat: true, .. })));
    }

    #[test]
    fn storybook_defaults_to_auto() {
        let cli = Cli::parse_from(["stagehand", "storybook", "ui"]);
        let Commands::Storybook(args) = cli.command else {
            panic!("expected storybook command");
        };
        assert_eq!(QwikCitySupport::from(args.qwik_city), QwikCitySupport::Auto);
    }

    #[test]
    fn value_enums_convert() {
        assert_eq!(Style::from(StyleArg::None), Style::None);
        assert_eq!(Linter::from(LinterArg::Eslint), Linter::EsLint);
        assert_eq!(UnitTestRunner::from(TestRunnerArg::None), UnitTestRunner::None);
    }

    #[test]
    fn cwd_is_global() {
        let cli = Cli::parse_from(["stagehand", "storybook", "ui", "--cwd", "/tmp/ws"]);
        assert_eq!(cli.global.cwd.as_deref(), Some(std::path::Path::new("/tmp/ws")));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["stagehand", "--quiet", "--verbose", "storybook", "ui"]);
        assert!(result.is_err());
    }
}
