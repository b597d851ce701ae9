//! Active and default project roots.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use projscope_core::{ProjectConfig, ProjectError, ProjectResult};

use crate::guard::normalize;

/// Holds the current project root and the immutable default it resets to.
///
/// Switches take the write lock; [`RootManager::with_current`] holds the read
/// lock for the duration of a closure so a walk never straddles two roots.
#[derive(Debug)]
pub struct RootManager {
    default: PathBuf,
    current: RwLock<PathBuf>,
}

impl RootManager {
    /// Create a manager whose default root is `root`, validated now.
    pub fn new(root: impl AsRef<Path>) -> ProjectResult<Self> {
        let default = validate_dir(&absolute(root.as_ref(), None)?)?;
        tracing::info!("Project root set to: {}", default.display());
        Ok(Self {
            current: RwLock::new(default.clone()),
            default,
        })
    }

    /// Create a manager from the configured override or the working directory.
    pub fn from_config(config: &ProjectConfig) -> ProjectResult<Self> {
        Self::new(config.default_root()?)
    }

    /// The current root.
    pub fn current(&self) -> PathBuf {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The default root established at construction.
    pub fn default_root(&self) -> &Path {
        &self.default
    }

    /// Run `f` against the current root while holding the read lock.
    pub fn with_current<R>(&self, f: impl FnOnce(&Path) -> R) -> R {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_path())
    }

    /// Switch to `candidate`; relative candidates resolve against the current root.
    pub fn switch_to(&self, candidate: impl AsRef<Path>) -> ProjectResult<PathBuf> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = validate_dir(&absolute(candidate.as_ref(), Some(current.as_path()))?)?;
        tracing::info!(
            "Project root switched: {} -> {}",
            current.display(),
            next.display()
        );
        *current = next.clone();
        Ok(next)
    }

    /// Restore the default root.
    pub fn reset(&self) -> PathBuf {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if *current != self.default {
            tracing::info!("Project root reset to: {}", self.default.display());
        }
        *current = self.default.clone();
        self.default.clone()
    }

    /// Whether the current root differs from the default.
    pub fn is_switched(&self) -> bool {
        self.with_current(|root| root != self.default.as_path())
    }
}

/// Make `path` absolute (against `base`, else the working directory) and normalize it.
fn absolute(path: &Path, base: Option<&Path>) -> ProjectResult<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    let joined = match base {
        Some(base) => base.join(path),
        None => std::env::current_dir()
            .map_err(|e| ProjectError::io(".", e))?
            .join(path),
    };
    Ok(normalize(&joined))
}

fn validate_dir(path: &Path) -> ProjectResult<PathBuf> {
    let metadata = std::fs::metadata(path).map_err(|e| ProjectError::io(path, e))?;
    if !metadata.is_dir() {
        return Err(ProjectError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}
