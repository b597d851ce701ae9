//! Project-level file operations against the active root.

use std::fs;
use std::path::{Path, PathBuf};

use projscope_core::{
    FileInfo, FileRecord, Listing, MetadataMode, ProjectConfig, ProjectError, ProjectResult,
};

use crate::enumerator::{EnumerationRequest, Enumerator};
use crate::guard::PathGuard;
use crate::pattern::NamePattern;
use crate::root::RootManager;

/// Owns the active root and exposes every listing, search and file-access
/// operation against it.
///
/// Each operation holds the root's read lock until it returns, so a
/// concurrent `switch_root` waits rather than splitting a walk.
#[derive(Debug)]
pub struct ProjectFiles {
    roots: RootManager,
    enumerator: Enumerator,
}

impl ProjectFiles {
    /// Create a project rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> ProjectResult<Self> {
        Ok(Self::with_parts(RootManager::new(root)?, Enumerator::new()))
    }

    /// Create a project from startup configuration.
    pub fn from_config(config: &ProjectConfig) -> ProjectResult<Self> {
        Ok(Self::with_parts(
            RootManager::from_config(config)?,
            Enumerator::new(),
        ))
    }

    /// Assemble from an existing root manager and enumerator.
    pub fn with_parts(roots: RootManager, enumerator: Enumerator) -> Self {
        Self { roots, enumerator }
    }

    /// The root manager.
    pub fn roots(&self) -> &RootManager {
        &self.roots
    }

    /// The current project root.
    pub fn root(&self) -> PathBuf {
        self.roots.current()
    }

    /// The default project root.
    pub fn default_root(&self) -> &Path {
        self.roots.default_root()
    }

    /// Switch the active root.
    pub fn switch_root(&self, candidate: impl AsRef<Path>) -> ProjectResult<PathBuf> {
        self.roots.switch_to(candidate)
    }

    /// Restore the default root.
    pub fn reset_root(&self) -> PathBuf {
        self.roots.reset()
    }

    /// Run an arbitrary enumeration against the current root.
    pub fn enumerate(&self, request: &EnumerationRequest) -> ProjectResult<Listing> {
        self.roots
            .with_current(|root| self.enumerator.enumerate(root, request))
    }

    /// All visible files.
    pub fn list_all(&self) -> ProjectResult<Vec<String>> {
        self.enumerate(&EnumerationRequest::new())
            .map(Listing::into_paths)
    }

    /// Visible files under a directory relative to the root.
    pub fn list_dir(&self, directory: &str) -> ProjectResult<Vec<String>> {
        self.enumerate(&EnumerationRequest::new().in_dir(directory))
            .map(Listing::into_paths)
    }

    /// All visible files with their modification times.
    pub fn list_with_time(&self) -> ProjectResult<Vec<FileRecord>> {
        self.records(MetadataMode::ModifiedOnly)
    }

    /// All visible files with modification times and sizes.
    pub fn list_with_details(&self) -> ProjectResult<Vec<FileRecord>> {
        self.records(MetadataMode::ModifiedAndSize)
    }

    /// Visible files with the given extension.
    pub fn list_by_extension(&self, extension: &str) -> ProjectResult<Vec<String>> {
        self.enumerate(&EnumerationRequest::new().with_extension(extension))
            .map(Listing::into_paths)
    }

    /// Visible files whose base name matches a wildcard pattern.
    pub fn search(&self, pattern: &str) -> ProjectResult<Vec<String>> {
        let pattern = NamePattern::compile(pattern)?;
        self.enumerate(&EnumerationRequest::new().matching(pattern))
            .map(Listing::into_paths)
    }

    /// Read a file under the root as UTF-8 text.
    pub fn read_file(&self, relative_path: &str) -> ProjectResult<String> {
        self.roots.with_current(|root| {
            let path = PathGuard::new(root).resolve(relative_path)?;
            let metadata = fs::metadata(&path).map_err(|e| ProjectError::io(&path, e))?;
            if !metadata.is_file() {
                return Err(ProjectError::NotAFile { path });
            }
            fs::read_to_string(&path).map_err(|e| ProjectError::io(&path, e))
        })
    }

    /// Create or overwrite a file under the root, creating parent directories.
    pub fn write_file(&self, relative_path: &str, content: &str) -> ProjectResult<PathBuf> {
        self.roots.with_current(|root| {
            let path = PathGuard::new(root).resolve(relative_path)?;
            if path.is_dir() {
                return Err(ProjectError::NotAFile { path });
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| ProjectError::io(parent, e))?;
            }
            fs::write(&path, content).map_err(|e| ProjectError::io(&path, e))?;
            tracing::info!("File written successfully: {relative_path}");
            Ok(path)
        })
    }

    /// Size and access information for a file under the root.
    pub fn file_info(&self, relative_path: &str) -> ProjectResult<FileInfo> {
        self.roots.with_current(|root| {
            let guard = PathGuard::new(root);
            let path = guard.resolve(relative_path)?;
            let metadata = fs::metadata(&path).map_err(|e| ProjectError::io(&path, e))?;
            Ok(FileInfo {
                relative_path: guard
                    .relativize(&path)
                    .unwrap_or_else(|| relative_path.to_string()),
                size: metadata.len(),
                readable: is_readable(&path, &metadata),
                writable: !metadata.permissions().readonly(),
            })
        })
    }

    fn records(&self, mode: MetadataMode) -> ProjectResult<Vec<FileRecord>> {
        let listing = self.enumerate(&EnumerationRequest::new().with_metadata(mode))?;
        Ok(listing.into_records().unwrap_or_default())
    }
}

fn is_readable(path: &Path, metadata: &fs::Metadata) -> bool {
    if metadata.is_dir() {
        fs::read_dir(path).is_ok()
    } else {
        fs::File::open(path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, ProjectFiles) {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/Main.java"), "class Main {}").unwrap();
        fs::write(temp.path().join("notes.txt"), "hello").unwrap();
        let project = ProjectFiles::new(temp.path()).unwrap();
        (temp, project)
    }

    #[test]
    fn test_read_file() {
        let (_temp, project) = project();
        assert_eq!(project.read_file("notes.txt").unwrap(), "hello");
        assert_eq!(project.read_file("src/../notes.txt").unwrap(), "hello");
    }

    #[test]
    fn test_read_file_errors() {
        let (_temp, project) = project();
        assert!(matches!(
            project.read_file("missing.txt").unwrap_err(),
            ProjectError::NotFound { .. }
        ));
        assert!(matches!(
            project.read_file("src").unwrap_err(),
            ProjectError::NotAFile { .. }
        ));
        assert!(matches!(
            project.read_file("../../etc/passwd").unwrap_err(),
            ProjectError::Containment { .. }
        ));
    }

    #[test]
    fn test_write_file_creates_parents() {
        let (temp, project) = project();
        let written = project.write_file("gen/deep/out.txt", "data").unwrap();
        assert_eq!(written, temp.path().join("gen/deep/out.txt"));
        assert_eq!(fs::read_to_string(&written).unwrap(), "data");
    }

    #[test]
    fn test_write_file_outside_root_rejected() {
        let (temp, project) = project();
        let err = project.write_file("../escape.txt", "x").unwrap_err();
        assert!(matches!(err, ProjectError::Containment { .. }));
        assert!(!temp.path().parent().unwrap().join("escape.txt").exists());
    }

    #[test]
    fn test_file_info() {
        let (_temp, project) = project();
        let info = project.file_info("./notes.txt").unwrap();
        assert_eq!(info.relative_path, "notes.txt");
        assert_eq!(info.size, 5);
        assert!(info.readable);
        assert!(info.writable);
    }

    #[test]
    fn test_search_and_extension() {
        let (_temp, project) = project();
        assert_eq!(project.search("*.txt").unwrap(), vec!["notes.txt"]);
        assert_eq!(project.list_by_extension("java").unwrap(), vec!["src/Main.java"]);
        assert!(project.search("").is_err());
    }

    #[test]
    fn test_operations_follow_root_switch() {
        let (temp, project) = project();
        project.switch_root("src").unwrap();
        assert_eq!(project.list_all().unwrap(), vec!["Main.java"]);
        assert!(project.read_file("../notes.txt").is_err());

        project.reset_root();
        assert_eq!(project.root(), temp.path());
        assert_eq!(project.list_all().unwrap(), vec!["notes.txt", "src/Main.java"]);
    }
}
