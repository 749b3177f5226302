use std::fmt;

use crate::domain::error::DomainError;

/// A workspace-relative, `/`-separated, normalized path.
///
/// Invariant: never absolute, never contains `.` or `..` segments, never
/// starts or ends with `/`. The empty path denotes the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspacePath(String);

impl WorkspacePath {
    /// The workspace root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Normalize `raw` against the workspace root.
    ///
    /// `\` is treated as a separator, `.` segments are dropped and `..`
    /// segments pop their parent. A path that is absolute or that climbs
    /// above the root is a [`DomainError::BoundaryViolation`].
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        Self::root().join(raw)
    }

    /// Resolve `segment` relative to `self`, keeping the result inside the
    /// workspace root.
    pub fn join(&self, segment: &str) -> Result<Self, DomainError> {
        let unified = segment.replace('\\', "/");
        if is_absolute(&unified) {
            return Err(DomainError::BoundaryViolation {
                path: segment.to_string(),
                boundary: "<workspace root>".into(),
            });
        }

        let mut parts: Vec<&str> = self.segments().collect();
        for part in unified.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    if parts.pop().is_none() {
                        return Err(DomainError::BoundaryViolation {
                            path: segment.to_string(),
                            boundary: "<workspace root>".into(),
                        });
                    }
                }
                other => parts.push(other),
            }
        }

        Ok(Self(parts.join("/")))
    }

    /// Resolve `segment` under `self` and require the result to stay within
    /// `self`.
    pub fn join_within(&self, segment: &str) -> Result<Self, DomainError> {
        let joined = self.join(segment).map_err(|_| DomainError::BoundaryViolation {
            path: segment.to_string(),
            boundary: self.display_root(),
        })?;
        if !joined.starts_with(self) {
            return Err(DomainError::BoundaryViolation {
                path: segment.to_string(),
                boundary: self.display_root(),
            });
        }
        Ok(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Segment-wise prefix test: `libs/a` starts with `libs` but not `lib`.
    pub fn starts_with(&self, other: &Self) -> bool {
        other.is_root()
            || self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0.as_bytes().get(other.0.len()) == Some(&b'/'))
    }

    /// Path relative to `base`, if `self` lies under it.
    pub fn strip_prefix(&self, base: &Self) -> Option<&str> {
        if !self.starts_with(base) {
            return None;
        }
        if base.is_root() {
            return Some(&self.0);
        }
        Some(self.0[base.0.len()..].trim_start_matches('/'))
    }

    fn display_root(&self) -> String {
        if self.is_root() {
            "<workspace root>".into()
        } else {
            self.0.clone()
        }
    }
}

fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/') || (bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic())
}

impl fmt::Display for WorkspacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WorkspacePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Join path fragments with `/`, skipping empty ones.
pub fn join_path_fragments(fragments: &[&str]) -> String {
    fragments
        .iter()
        .flat_map(|f| f.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Relative path from directory `from` back to the workspace root (`../..`).
pub fn offset_from_root(from: &str) -> String {
    let depth = from.split('/').filter(|s| !s.is_empty()).count();
    if depth == 0 {
        "./".into()
    } else {
        "../".repeat(depth)
    }
}
