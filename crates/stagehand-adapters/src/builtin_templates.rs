//! Template sets compiled into the binary.
//!
//! | Set         | Destination                  | Files                                    |
//! |-------------|------------------------------|------------------------------------------|
//! | `library`   | project root                 | README, package.json, tsconfigs, vite    |
//! | `component` | component directory          | component, style, spec, stories          |
//! | `storybook` | project root                 | `.storybook/main.ts`, `.storybook/preview.ts`, tsconfig |
//!
//! Files whose name ends in `__tmpl__` are rendered; everything else is
//! copied verbatim. An on-disk directory can replace individual files or
//! whole sets, see [`override_dir`] and
//! [`InMemoryStore::overlay_dir`](crate::InMemoryStore::overlay_dir).

use std::path::PathBuf;

use tracing::debug;

use stagehand_core::domain::{TemplateFile, TemplateSet};

/// Environment variable pointing at a directory of template overrides.
pub const TEMPLATES_DIR_ENV: &str = "STAGEHAND_TEMPLATES_DIR";

macro_rules! builtin {
    ($set:literal, $path:literal) => {
        file(
            $path,
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/", $set, "/", $path)),
        )
    };
}

fn file(path: &'static str, source: &'static str) -> TemplateFile {
    if path.ends_with("__tmpl__") {
        TemplateFile::parameterized(path, source)
    } else {
        TemplateFile::literal(path, source)
    }
}

pub fn library_set() -> TemplateSet {
    TemplateSet::new(
        "library",
        vec![
            builtin!("library", "README.md__tmpl__"),
            builtin!("library", "package.json__tmpl__"),
            builtin!("library", "src/index.ts"),
            builtin!("library", "tsconfig.json__tmpl__"),
            builtin!("library", "tsconfig.lib.json__tmpl__"),
            builtin!("library", "tsconfig.spec.json__tmpl__"),
            builtin!("library", "vite.config.ts__tmpl__"),
        ],
    )
}

pub fn component_set() -> TemplateSet {
    TemplateSet::new(
        "component",
        vec![
            builtin!("component", "__fileName__.tsx__tmpl__"),
            builtin!("component", "__fileName__.__style__"),
            builtin!("component", "__fileName__.spec.tsx__tmpl__"),
            builtin!("component", "__fileName__.stories.tsx__tmpl__"),
        ],
    )
}

pub fn storybook_set() -> TemplateSet {
    TemplateSet::new(
        "storybook",
        vec![
            builtin!("storybook", ".storybook/main.ts__tmpl__"),
            builtin!("storybook", ".storybook/preview.ts__tmpl__"),
            builtin!("storybook", "tsconfig.storybook.json__tmpl__"),
        ],
    )
}

/// Every built-in set.
pub fn all_sets() -> Vec<TemplateSet> {
    vec![library_set(), component_set(), storybook_set()]
}

/// Override directory named by `$STAGEHAND_TEMPLATES_DIR`, if set and
/// present on disk.
pub fn override_dir() -> Option<PathBuf> {
    let dir = PathBuf::from(std::env::var_os(TEMPLATES_DIR_ENV)?);
    if dir.is_dir() {
        debug!(path = %dir.display(), "template override directory");
        Some(dir)
    } else {
        debug!(path = %dir.display(), "template override directory missing, ignored");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::domain::TemplateContent;

    #[test]
    fn sets_are_named_and_non_empty() {
        let ids: Vec<String> = all_sets().iter().map(|s| s.id().to_string()).collect();
        assert_eq!(ids, vec!["library", "component", "storybook"]);
        assert!(all_sets().iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn only_tmpl_files_are_parameterized() {
        for set in all_sets() {
            for f in set.files() {
                let parameterized = matches!(f.content, TemplateContent::Parameterized(_));
                assert_eq!(parameterized, f.path.ends_with("__tmpl__"), "{}", f.path);
            }
        }
    }
}
