//! Domain value objects: request enums shared by every generator.
//!
//! These are pure value types: `Copy`, equality-by-value, no identity. Each
//! carries its string form and a `FromStr` parser so the CLI, configuration
//! files and JSON requests all accept the same spellings.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Linter ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linter {
    None,
    #[default]
    EsLint,
}

impl Linter {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::EsLint => "eslint",
        }
    }
}

impl fmt::Display for Linter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Linter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "eslint" => Ok(Self::EsLint),
            other => Err(DomainError::validation(
                "linter",
                format!("unknown linter '{other}'; expected one of: none, eslint"),
            )),
        }
    }
}

// ── Style ────────────────────────────────────────────────────────────────────

/// Stylesheet flavour for generated components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Css,
    Scss,
    Less,
    Styl,
    None,
}

impl Style {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Less => "less",
            Self::Styl => "styl",
            Self::None => "none",
        }
    }

    /// File extension of the stylesheet, `None` when no stylesheet is emitted.
    pub const fn extension(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "css" => Ok(Self::Css),
            "scss" => Ok(Self::Scss),
            "less" => Ok(Self::Less),
            "styl" => Ok(Self::Styl),
            "none" => Ok(Self::None),
            other => Err(DomainError::validation(
                "style",
                format!("unknown style '{other}'; expected one of: css, scss, less, styl, none"),
            )),
        }
    }
}

// ── UnitTestRunner ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitTestRunner {
    #[default]
    Vitest,
    None,
}

impl UnitTestRunner {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vitest => "vitest",
            Self::None => "none",
        }
    }
}

impl fmt::Display for UnitTestRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitTestRunner {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vitest" => Ok(Self::Vitest),
            "none" => Ok(Self::None),
            other => Err(DomainError::validation(
                "unit_test_runner",
                format!("unknown test runner '{other}'; expected one of: vitest, none"),
            )),
        }
    }
}

// ── ProjectNameAndRootFormat ─────────────────────────────────────────────────

/// How project name and root are computed from `name` + `directory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectNameAndRootFormat {
    /// Name and root are used exactly as given.
    AsProvided,
    /// Root goes under the workspace libs directory, name is the dashed path.
    #[default]
    Derived,
}

impl ProjectNameAndRootFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AsProvided => "as-provided",
            Self::Derived => "derived",
        }
    }
}

impl fmt::Display for ProjectNameAndRootFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectNameAndRootFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "as-provided" | "as_provided" => Ok(Self::AsProvided),
            "derived" => Ok(Self::Derived),
            other => Err(DomainError::validation(
                "project_name_and_root_format",
                format!("unknown format '{other}'; expected one of: as-provided, derived"),
            )),
        }
    }
}

// ── QwikCitySupport ──────────────────────────────────────────────────────────

/// Whether storybook previews wrap stories in the qwik-city router decorator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QwikCitySupport {
    True,
    False,
    #[default]
    Auto,
}

impl QwikCitySupport {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for QwikCitySupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QwikCitySupport {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "true" | "yes" => Ok(Self::True),
            "false" | "no" => Ok(Self::False),
            "auto" => Ok(Self::Auto),
            other => Err(DomainError::validation(
                "qwik_city_support",
                format!("unknown value '{other}'; expected one of: true, false, auto"),
            )),
        }
    }
}

// ── ProjectType ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Application,
    Library,
}

impl ProjectType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Library => "library",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
