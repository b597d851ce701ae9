//! Visibility rules for discovered files.

/// Directory names whose contents are never listed.
pub const EXCLUDED_DIRS: &[&str] = &["target", ".git", ".idea", "node_modules", ".mvn"];

/// File suffixes (compiled artifacts) that are never listed.
pub const EXCLUDED_SUFFIXES: &[&str] = &[".class"];

/// Decides whether a file is visible, by path segment and file suffix.
///
/// Segments are compared whole, so `targetfile.txt` or `my-target/x` stay
/// visible while anything under a `target/` directory does not.
#[derive(Debug, Clone, Copy)]
pub struct ExclusionPolicy {
    dirs: &'static [&'static str],
    suffixes: &'static [&'static str],
}

impl ExclusionPolicy {
    /// Create a policy from explicit rule sets.
    pub const fn new(dirs: &'static [&'static str], suffixes: &'static [&'static str]) -> Self {
        Self { dirs, suffixes }
    }

    /// Whether a `/`-separated, root-relative file path should be visible.
    pub fn include(&self, relative_path: &str) -> bool {
        let mut segments = relative_path.split('/').filter(|s| !s.is_empty());
        let Some(file_name) = segments.next_back() else {
            return false;
        };
        if segments.any(|dir| self.prunes(dir)) {
            return false;
        }
        !self.suffixes.iter().any(|suffix| file_name.ends_with(suffix))
    }

    /// Whether a directory with this name is excluded wholesale.
    pub fn prunes(&self, dir_name: &str) -> bool {
        self.dirs.contains(&dir_name)
    }
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::new(EXCLUDED_DIRS, EXCLUDED_SUFFIXES)
    }
}
