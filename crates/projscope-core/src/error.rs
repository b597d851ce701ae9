//! Error types for project file operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by root management, enumeration, file access and reconciliation.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Path does not exist.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Path exists but is not a directory.
    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Path exists but is not a regular file.
    #[error("Path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Resolved path escapes the active root.
    #[error("Access denied: {path} is outside project root {root}")]
    Containment { path: PathBuf, root: PathBuf },

    /// Search pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Tracking store lookup or save failed for a path.
    #[error("Persistence failure for {path}: {source}")]
    Persistence {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Fieldless discriminant of [`ProjectError`], for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    NotADirectory,
    NotAFile,
    Containment,
    InvalidPattern,
    Persistence,
    Io,
    InvalidConfig,
}

impl ProjectError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Wrap a store failure for the given tracked path.
    pub fn persistence<E>(path: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Persistence {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotADirectory { .. } => ErrorKind::NotADirectory,
            Self::NotAFile { .. } => ErrorKind::NotAFile,
            Self::Containment { .. } => ErrorKind::Containment,
            Self::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            Self::Persistence { .. } => ErrorKind::Persistence,
            Self::Io { .. } => ErrorKind::Io,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }
}

/// Result alias used across projscope crates.
pub type ProjectResult<T> = Result<T, ProjectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let err = ProjectError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, ProjectError::NotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_io_other_kept_as_io() {
        let err = ProjectError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("/test/path"));
    }

    #[test]
    fn test_persistence_keeps_source() {
        let cause = std::io::Error::other("disk full");
        let err = ProjectError::persistence("src/lib.rs", cause);
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(err.to_string().contains("src/lib.rs"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
