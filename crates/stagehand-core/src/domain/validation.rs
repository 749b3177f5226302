use crate::domain::error::DomainError;

/// Centralized request validation.
///
/// Rules for names, directories and import paths live here so every
/// generator rejects the same inputs with the same messages.
pub struct DomainValidator;

impl DomainValidator {
    /// A project or component name: `/`-separated segments of
    /// `[A-Za-z0-9_-]`, each starting with a letter or digit.
    pub fn validate_name(field: &'static str, name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation(field, "must not be empty"));
        }
        validate_segments(field, name)
    }

    /// A directory relative to the libs directory (or workspace root).
    pub fn validate_directory(directory: &str) -> Result<(), DomainError> {
        if directory.starts_with('/') || directory.starts_with('\\') || directory.contains(':') {
            return Err(DomainError::validation("directory", "must be a relative path"));
        }
        let trimmed = directory.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(());
        }
        validate_segments("directory", trimmed)
    }

    /// An import specifier such as `@scope/my-lib`.
    pub fn validate_import_path(import_path: &str) -> Result<(), DomainError> {
        if import_path.is_empty() {
            return Err(DomainError::validation("import_path", "must not be empty"));
        }
        if import_path.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("import_path", "must not contain whitespace"));
        }
        if import_path.starts_with('/') || import_path.starts_with('.') {
            return Err(DomainError::validation(
                "import_path",
                "must not start with '/' or '.'",
            ));
        }
        if import_path.split('/').any(|s| s == ".." || s.is_empty()) {
            return Err(DomainError::validation(
                "import_path",
                format!("'{import_path}' has an empty or '..' segment"),
            ));
        }
        Ok(())
    }

    /// Comma separated tags; returns them trimmed with empties dropped.
    pub fn parse_tags(raw: Option<&str>) -> Result<Vec<String>, DomainError> {
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                if t.chars().any(char::is_whitespace) {
                    Err(DomainError::validation("tags", format!("tag '{t}' contains whitespace")))
                } else {
                    Ok(t.to_string())
                }
            })
            .collect()
    }
}

fn validate_segments(field: &'static str, value: &str) -> Result<(), DomainError> {
    for segment in value.split('/') {
        if segment.is_empty() {
            return Err(DomainError::validation(field, format!("'{value}' has an empty path segment")));
        }
        if segment == "." || segment == ".." {
            return Err(DomainError::validation(
                field,
                format!("'{value}' must not contain '.' or '..' segments"),
            ));
        }
        let mut chars = segment.chars();
        if !chars.next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::validation(
                field,
                format!("segment '{segment}' must start with a letter or digit"),
            ));
        }
        if let Some(bad) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(DomainError::validation(
                field,
                format!("'{value}' contains the invalid character '{bad}'"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert!(DomainValidator::validate_name("name", "my-lib").is_ok());
        assert!(DomainValidator::validate_name("name", "shared/my_lib2").is_ok());
        assert!(DomainValidator::validate_name("name", "").is_err());
        assert!(DomainValidator::validate_name("name", "  ").is_err());
        assert!(DomainValidator::validate_name("name", "my lib").is_err());
        assert!(DomainValidator::validate_name("name", "-lib").is_err());
        assert!(DomainValidator::validate_name("name", "a//b").is_err());
        assert!(DomainValidator::validate_name("name", "../evil").is_err());
        assert!(DomainValidator::validate_name("name", "lib$").is_err());
    }

    #[test]
    fn directories() {
        assert!(DomainValidator::validate_directory("shared/ui").is_ok());
        assert!(DomainValidator::validate_directory("shared/").is_ok());
        assert!(DomainValidator::validate_directory("/abs").is_err());
        assert!(DomainValidator::validate_directory("C:/x").is_err());
        assert!(DomainValidator::validate_directory("a/../../b").is_err());
    }

    #[test]
    fn import_paths() {
        assert!(DomainValidator::validate_import_path("@acme/shared-my-lib").is_ok());
        assert!(DomainValidator::validate_import_path("./x").is_err());
        assert!(DomainValidator::validate_import_path("@acme/../x").is_err());
        assert!(DomainValidator::validate_import_path("@acme/my lib").is_err());
    }

    #[test]
    fn tags_are_trimmed() {
        assert_eq!(
            DomainValidator::parse_tags(Some(" scope:shared, type:ui ,,")).unwrap(),
            vec!["scope:shared", "type:ui"]
        );
        assert!(DomainValidator::parse_tags(None).unwrap().is_empty());
    }
}
