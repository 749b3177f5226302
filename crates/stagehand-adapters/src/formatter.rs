//! Whitespace formatter.

use serde_json::Value;
use tracing::trace;

use stagehand_core::{application::ports::Formatter, domain::WorkspacePath};

/// Extensions treated as plain text.
const TEXT_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "md", "css", "scss", "less", "styl", "html", "yml", "yaml",
];

/// Normalizes layout without touching meaning.
///
/// JSON is re-printed with two-space indentation and key order preserved.
/// Other text files lose trailing whitespace on every line, except Markdown
/// lines ending in two or more spaces, which are hard line breaks. Every
/// handled non-empty file ends in exactly one newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceFormatter;

impl WhitespaceFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for WhitespaceFormatter {
    fn format(&self, path: &WorkspacePath, content: &str) -> Option<String> {
        let extension = path.file_name()?.rsplit_once('.')?.1;
        let formatted = if extension == "json" {
            match serde_json::from_str::<Value>(content) {
                Ok(value) => serde_json::to_string_pretty(&value).ok()?,
                Err(e) => {
                    trace!(path = %path, error = %e, "not valid JSON, trimming only");
                    trim_lines(content)
                }
            }
        } else if extension == "md" {
            trim_markdown_lines(content)
        } else if TEXT_EXTENSIONS.contains(&extension) {
            trim_lines(content)
        } else {
            return None;
        };
        Some(terminate(formatted))
    }
}

fn trim_lines(content: &str) -> String {
    content.lines().map(str::trim_end).collect::<Vec<_>>().join("\n")
}

fn trim_markdown_lines(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            let text = line.trim_end_matches(' ');
            let hard_break = line.len() - text.len() >= 2 && !text.trim().is_empty();
            if hard_break { line } else { line.trim_end() }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn terminate(mut text: String) -> String {
    let len = text.trim_end_matches('\n').len();
    text.truncate(len);
    if !text.is_empty() {
        text.push('\n');
    }
    text
}
