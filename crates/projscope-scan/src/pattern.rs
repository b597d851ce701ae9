//! Wildcard search patterns for file names.

use std::fmt;

use regex::Regex;

use projscope_core::{ProjectError, ProjectResult};

/// A compiled file-name pattern.
///
/// `*` matches any run of characters (including none), `?` exactly one
/// character. Everything else is literal. Patterns match the whole base name.
#[derive(Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    /// Compile a user pattern.
    pub fn compile(pattern: &str) -> ProjectResult<Self> {
        if pattern.is_empty() {
            return Err(ProjectError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "pattern is empty".to_string(),
            });
        }

        let regex = Regex::new(&translate(pattern)).map_err(|e| ProjectError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as typed.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether a base file name matches.
    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }
}

impl fmt::Debug for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamePattern").field(&self.source).finish()
    }
}

/// Translate wildcards into an anchored regex, escaping every literal run.
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?s)^");
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}
