//! Filesystem-based template loader.
//!
//! Reads template sets from a directory tree so a workspace can override
//! the built-in sets.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── library/
//! │   ├── template.toml            ← manifest (optional)
//! │   ├── README.md__tmpl__
//! │   └── src/
//! │       └── index.ts
//! └── component/
//!     └── __fileName__.tsx__tmpl__
//! ```
//!
//! Each immediate subdirectory is one set, named after the directory.
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! id = "library"          # defaults to the directory name
//! replace = false         # true: the set replaces the built-in one
//!                         # false: files are merged over it
//!
//! # Optional: override per-file content type.
//! # If omitted, files ending in __tmpl__ or containing {{ are parameterized.
//! [[files]]
//! path = "README.md"
//! type = "literal"        # literal | parameterized
//! ```

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use stagehand_core::{
    application::ApplicationError,
    domain::{TemplateFile, TemplateSet},
    error::StagehandError,
};

const MANIFEST: &str = "template.toml";

/// Failures while reading a template directory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("templates directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl From<LoadError> for StagehandError {
    fn from(err: LoadError) -> Self {
        ApplicationError::TemplateStore {
            reason: err.to_string(),
        }
        .into()
    }
}

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `template.toml` file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TemplateManifest {
    #[serde(default)]
    pub template: TemplateSection,
    /// Explicit per-file type overrides.
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// `[template]` section.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TemplateSection {
    pub id: Option<String>,
    /// Replace the built-in set of the same id instead of merging into it.
    #[serde(default)]
    pub replace: bool,
}

/// One entry under `[[files]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct FileEntry {
    /// Relative path from the set root.
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Literal,
    Parameterized,
}

/// A set read from disk plus how it combines with an existing one.
#[derive(Debug, Clone)]
pub struct LoadedSet {
    pub set: TemplateSet,
    pub replace: bool,
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`TemplateSet`]s from a directory of set directories.
///
/// Subdirectories whose manifest is malformed emit a `WARN` log and are
/// skipped; they do not prevent other sets from loading.
pub struct FilesystemTemplateLoader {
    templates_dir: PathBuf,
}

impl FilesystemTemplateLoader {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    /// Load every set under the templates directory, sorted by id.
    #[instrument(skip(self), fields(dir = %self.templates_dir.display()))]
    pub fn load_all(&self) -> Result<Vec<LoadedSet>, LoadError> {
        if !self.templates_dir.is_dir() {
            return Err(LoadError::MissingDirectory(self.templates_dir.clone()));
        }

        let read_dir = fs::read_dir(&self.templates_dir).map_err(|source| LoadError::Io {
            path: self.templates_dir.clone(),
            source,
        })?;

        let mut sets = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| LoadError::Io {
                path: self.templates_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            match load_set(&path) {
                Ok(loaded) => {
                    debug!(id = %loaded.set.id(), files = loaded.set.len(), "loaded template set");
                    sets.push(loaded);
                }
                Err(e) => {
                    warn!(dir = %path.display(), error = %e, "skipping template directory");
                }
            }
        }

        sets.sort_by(|a, b| a.set.id().as_str().cmp(b.set.id().as_str()));
        Ok(sets)
    }
}

/// Load one set directory.
fn load_set(dir: &Path) -> Result<LoadedSet, LoadError> {
    let manifest_path = dir.join(MANIFEST);
    let manifest = if manifest_path.is_file() {
        let raw = fs::read_to_string(&manifest_path).map_err(|source| LoadError::Io {
            path: manifest_path.clone(),
            source,
        })?;
        toml::from_str::<TemplateManifest>(&raw).map_err(|source| LoadError::Manifest {
            path: manifest_path.clone(),
            source,
        })?
    } else {
        TemplateManifest::default()
    };

    let id = manifest.template.id.clone().unwrap_or_else(|| {
        dir.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let overrides: HashMap<String, FileType> = manifest
        .files
        .iter()
        .map(|f| (normalize_path(&f.path), f.file_type))
        .collect();

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        if rel == Path::new(MANIFEST) {
            continue;
        }

        let path = normalize_path(&rel.to_string_lossy());
        let content = fs::read_to_string(entry.path()).map_err(|source| LoadError::Io {
            path: entry.path().to_path_buf(),
            source,
        })?;
        files.push(resolve_file(path, content, overrides.get(&normalize_path(&strip_tmpl(rel)))));
    }

    Ok(LoadedSet {
        set: TemplateSet::new(id, files),
        replace: manifest.template.replace,
    })
}

/// Pick literal or parameterized for one file. An explicit manifest entry
/// wins over detection.
fn resolve_file(path: String, content: String, explicit: Option<&FileType>) -> TemplateFile {
    let parameterized = match explicit {
        Some(FileType::Parameterized) => true,
        Some(FileType::Literal) => false,
        None => path.ends_with("__tmpl__") || content.contains("{{"),
    };
    if parameterized {
        TemplateFile::parameterized(path, content)
    } else {
        TemplateFile::literal(path, content)
    }
}

fn strip_tmpl(path: &Path) -> String {
    let s = path.to_string_lossy();
    s.strip_suffix("__tmpl__").unwrap_or(&s).to_string()
}

/// Forward slashes on every platform.
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
