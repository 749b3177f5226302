//! Name casing variants used by templates and path derivation.
//!
//! A single user-supplied name (`my-button`, `MyButton`, `my_button`) fans out
//! into the identifier styles generated TypeScript code needs:
//!
//! | Variant         | `my-button`  | Used for                     |
//! |-----------------|--------------|------------------------------|
//! | `file_name`     | `my-button`  | file and directory names     |
//! | `class_name`    | `MyButton`   | component identifiers        |
//! | `property_name` | `myButton`   | variables, object keys       |
//! | `constant_name` | `MY_BUTTON`  | constants                    |
//! | `snake_name`    | `my_button`  | rarely, but templates ask    |

/// All casing variants of one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names {
    pub name: String,
    pub class_name: String,
    pub property_name: String,
    pub constant_name: String,
    pub file_name: String,
    pub snake_name: String,
}

impl Names {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            class_name: to_pascal_case(&name),
            property_name: to_camel_case(&name),
            constant_name: to_constant_case(&name),
            file_name: to_kebab_case(&name),
            snake_name: to_snake_case(&name),
            name,
        }
    }

    /// Template variable pairs, keyed the way template sources reference them.
    pub fn variables(&self) -> [(&'static str, &str); 6] {
        [
            ("name", self.name.as_str()),
            ("className", self.class_name.as_str()),
            ("propertyName", self.property_name.as_str()),
            ("constantName", self.constant_name.as_str()),
            ("fileName", self.file_name.as_str()),
            ("snakeName", self.snake_name.as_str()),
        ]
    }
}

/// `MyApp` / `my app` → `my_app`
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// `MyApp` / `my_app` → `my-app`
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// `my-app` → `MY_APP`
pub fn to_constant_case(s: &str) -> String {
    split_words(s).join("_").to_uppercase()
}

/// `my-app` → `MyApp`
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// `my-app` → `myApp`
pub fn to_camel_case(s: &str) -> String {
    let words = split_words(s);
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::new();
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Split a string into lowercase words.
///
/// Boundaries:
/// 1. `_`, `-`, `/`, `.` and whitespace always split
/// 2. lowercase or digit followed by uppercase: `myApp` → `my` + `app`
/// 3. acronym end: `HTTPServer` → `http` + `server`
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c == '/' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(&next) = chars.peek() {
            if (c.is_lowercase() || c.is_ascii_digit()) && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_from_kebab() {
        let names = Names::new("my-button");
        assert_eq!(names.class_name, "MyButton");
        assert_eq!(names.property_name, "myButton");
        assert_eq!(names.constant_name, "MY_BUTTON");
        assert_eq!(names.file_name, "my-button");
        assert_eq!(names.snake_name, "my_button");
    }

    #[test]
    fn names_from_pascal() {
        let names = Names::new("MyButton");
        assert_eq!(names.file_name, "my-button");
        assert_eq!(names.class_name, "MyButton");
    }

    #[test]
    fn acronyms_split_on_last_capital() {
        assert_eq!(split_words("HTTPServer"), vec!["http", "server"]);
        assert_eq!(to_kebab_case("XMLHttpRequest"), "xml-http-request");
    }

    #[test]
    fn path_separators_split_words() {
        assert_eq!(to_kebab_case("shared/my-lib"), "shared-my-lib");
    }

    #[test]
    fn digits_stay_attached() {
        assert_eq!(to_kebab_case("lib2Go"), "lib2-go");
        assert_eq!(to_pascal_case("ui-v2"), "UiV2");
    }

    #[test]
    fn empty_name_produces_empty_variants() {
        let names = Names::new("");
        assert!(names.class_name.is_empty());
        assert!(names.file_name.is_empty());
    }
}
