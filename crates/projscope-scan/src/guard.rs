//! Root containment for user-supplied paths.

use std::path::{Component, Path, PathBuf};

use projscope_core::{ProjectError, ProjectResult};

/// Resolves paths against a root and rejects anything that escapes it.
///
/// All checks are lexical: `.` and `..` are folded before the prefix test,
/// so `src/../../etc` is caught even though the raw join starts with the root.
/// Existence is left to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Create a guard for the given root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: normalize(root.as_ref()),
        }
    }

    /// The normalized root this guard enforces.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `input` (relative to the root, or absolute) to a normalized path inside the root.
    pub fn resolve(&self, input: impl AsRef<Path>) -> ProjectResult<PathBuf> {
        let candidate = normalize(&self.root.join(input));
        if candidate.starts_with(&self.root) {
            Ok(candidate)
        } else {
            Err(ProjectError::Containment {
                path: candidate,
                root: self.root.clone(),
            })
        }
    }

    /// Root-relative, `/`-separated form of a path under the root.
    pub fn relativize(&self, path: &Path) -> Option<String> {
        relativize(&self.root, path)
    }
}

/// Lexically normalize a path, folding `.`, `..` and redundant separators.
///
/// `..` never climbs above a root directory; leading `..` on relative paths is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(name) => out.push(name),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Root-relative, `/`-separated form of `path`, or `None` if it is not under `root`.
pub fn relativize(root: &Path, path: &Path) -> Option<String> {
    let rest = path.strip_prefix(root).ok()?;
    let segments: Vec<_> = rest
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a//b/")), PathBuf::from("/a/b"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("../../x")), PathBuf::from("../../x"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_resolve_inside_root() {
        let guard = PathGuard::new("/project");
        assert_eq!(
            guard.resolve("src/main.rs").unwrap(),
            PathBuf::from("/project/src/main.rs")
        );
        assert_eq!(
            guard.resolve("src/../docs/./a.md").unwrap(),
            PathBuf::from("/project/docs/a.md")
        );
        assert_eq!(guard.resolve("").unwrap(), PathBuf::from("/project"));
        assert_eq!(guard.resolve(".").unwrap(), PathBuf::from("/project"));
    }

    #[test]
    fn test_resolve_escape_rejected() {
        let guard = PathGuard::new("/project");
        for input in ["../etc/passwd", "src/../../etc", "a/b/../../../x", ".."] {
            let err = guard.resolve(input).unwrap_err();
            assert!(
                matches!(err, ProjectError::Containment { .. }),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_absolute_input() {
        let guard = PathGuard::new("/project");
        assert!(guard.resolve("/project/src/lib.rs").is_ok());
        assert!(guard.resolve("/etc/passwd").is_err());
    }

    #[test]
    fn test_sibling_prefix_is_not_contained() {
        let guard = PathGuard::new("/project");
        assert!(guard.resolve("../project-other/file").is_err());
    }

    #[test]
    fn test_root_is_normalized() {
        let guard = PathGuard::new("/project/./sub/..");
        assert_eq!(guard.root(), Path::new("/project"));
        assert!(guard.resolve("x").is_ok());
    }

    #[test]
    fn test_relativize() {
        let root = Path::new("/project");
        assert_eq!(
            relativize(root, Path::new("/project/a/b.java")),
            Some("a/b.java".to_string())
        );
        assert_eq!(relativize(root, Path::new("/elsewhere/a")), None);
    }
}
