//! Output management and formatting.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;

use stagehand_core::application::DependencySet;
use stagehand_core::domain::{ChangeKind, FileChange};

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

/// One line of the JSON change report.
#[derive(Debug, Serialize)]
struct ChangeEntry<'a> {
    kind: ChangeKind,
    path: &'a str,
    bytes: usize,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    dry_run: bool,
    changes: Vec<ChangeEntry<'a>>,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // Resolve Auto → Human (TTY) or Plain (piped/redirected).
        let resolved_format = if args.output_format == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            args.output_format
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color || config.output.no_color || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet || self.is_json() {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet || self.is_json() {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}")
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet || self.is_json() {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}")
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet || self.is_json() {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}")
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// The change list, one `KIND path (n bytes)` line per file, or a JSON
    /// report in JSON mode. JSON is printed even in quiet mode.
    pub fn changes(&self, changes: &[FileChange], dry_run: bool) -> io::Result<()> {
        if self.is_json() {
            let report = Report {
                dry_run,
                changes: changes
                    .iter()
                    .map(|change| ChangeEntry {
                        kind: change.kind,
                        path: change.path.as_str(),
                        bytes: change.content.as_ref().map_or(0, Vec::len),
                    })
                    .collect(),
            };
            let json = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
            return self.term.write_line(&json);
        }
        if self.quiet {
            return Ok(());
        }
        for change in changes {
            self.term.write_line(&self.change_line(change))?;
        }
        Ok(())
    }

    fn change_line(&self, change: &FileChange) -> String {
        let label = format!("{:<6}", change.kind.to_string());
        let detail = match &change.content {
            Some(content) => format!("{} ({} bytes)", change.path, content.len()),
            None => change.path.to_string(),
        };
        if !self.supports_color() {
            return format!("{label} {detail}");
        }
        let label = match change.kind {
            ChangeKind::Create => label.green().bold().to_string(),
            ChangeKind::Update => label.yellow().bold().to_string(),
            ChangeKind::Delete => label.red().bold().to_string(),
        };
        format!("{label} {detail}")
    }

    /// Packages recorded by a dry run.
    pub fn dependencies(&self, sets: &[DependencySet]) -> io::Result<()> {
        for set in sets {
            for (name, version) in &set.dependencies {
                self.info(&format!("would add dependency {name}@{version}"))?;
            }
            for (name, version) in &set.dev_dependencies {
                self.info(&format!("would add devDependency {name}@{version}"))?;
            }
        }
        Ok(())
    }

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    fn is_json(&self) -> bool {
        self.resolved_format == OutputFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::domain::WorkspacePath;

    fn make_manager(format: OutputFormat, no_color: bool) -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color,
            config: None,
            cwd: None,
            output_format: format,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    fn change(path: &str, kind: ChangeKind, content: Option<&str>) -> FileChange {
        FileChange {
            path: WorkspacePath::parse(path).unwrap(),
            kind,
            content: content.map(|c| c.as_bytes().to_vec()),
        }
    }

    #[test]
    fn change_lines_are_plain_without_color() {
        let out = make_manager(OutputFormat::Plain, false);
        assert!(!out.supports_color());
        assert_eq!(
            out.change_line(&change("libs/a/README.md", ChangeKind::Create, Some("# a\n"))),
            "CREATE libs/a/README.md (4 bytes)"
        );
        assert_eq!(
            out.change_line(&change("libs/a/old.ts", ChangeKind::Delete, None)),
            "DELETE libs/a/old.ts"
        );
    }

    #[test]
    fn human_format_keeps_color_unless_disabled() {
        assert!(make_manager(OutputFormat::Human, false).supports_color());
        assert!(!make_manager(OutputFormat::Human, true).supports_color());
    }

    #[test]
    fn json_entries_serialize_kind_in_lowercase() {
        let entry = ChangeEntry {
            kind: ChangeKind::Update,
            path: "tsconfig.base.json",
            bytes: 2,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({"kind": "update", "path": "tsconfig.base.json", "bytes": 2})
        );
    }
}
