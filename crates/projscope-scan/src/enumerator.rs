//! JWalk-based project file enumeration.

use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

use jwalk::{Parallelism, WalkDir};

use projscope_core::{FileRecord, Listing, MetadataMode, ProjectError, ProjectResult};

use crate::exclusion::ExclusionPolicy;
use crate::guard::PathGuard;
use crate::pattern::NamePattern;

/// What to enumerate and how much metadata to collect.
#[derive(Debug, Clone, Default)]
pub struct EnumerationRequest {
    /// Subdirectory to walk, relative to the root (the whole root when `None`).
    pub scope: Option<String>,
    /// Metadata collected per file.
    pub metadata: MetadataMode,
    /// Base-name filter.
    pub name_filter: Option<NamePattern>,
    /// Required file extension, without the leading dot.
    pub extension: Option<String>,
}

impl EnumerationRequest {
    /// Enumerate the whole root with no metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the walk to a subdirectory of the root.
    pub fn in_dir(mut self, dir: impl Into<String>) -> Self {
        self.scope = Some(dir.into());
        self
    }

    /// Set the metadata mode.
    pub fn with_metadata(mut self, mode: MetadataMode) -> Self {
        self.metadata = mode;
        self
    }

    /// Keep only files whose base name matches.
    pub fn matching(mut self, pattern: NamePattern) -> Self {
        self.name_filter = Some(pattern);
        self
    }

    /// Keep only files with the given extension (`"java"` or `".java"`).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = Some(extension.trim_start_matches('.').to_string());
        self
    }
}

/// Walks a project root and produces sorted, filtered relative paths.
#[derive(Debug, Clone, Default)]
pub struct Enumerator {
    policy: ExclusionPolicy,
}

impl Enumerator {
    /// Create an enumerator with the default exclusion rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an enumerator with a custom exclusion policy.
    pub fn with_policy(policy: ExclusionPolicy) -> Self {
        Self { policy }
    }

    /// The exclusion policy in use.
    pub fn policy(&self) -> &ExclusionPolicy {
        &self.policy
    }

    /// Enumerate regular files under `root` (or the request's scope).
    ///
    /// Results are sorted by relative path. Symlinks are neither followed nor
    /// listed. Unreadable directories and paths that are not valid UTF-8 are
    /// skipped with a warning, and an unreadable modification time degrades
    /// to `UNIX_EPOCH`.
    pub fn enumerate(&self, root: &Path, request: &EnumerationRequest) -> ProjectResult<Listing> {
        let guard = PathGuard::new(root);
        let scope = match &request.scope {
            Some(dir) => guard.resolve(dir)?,
            None => guard.root().to_path_buf(),
        };

        let metadata = std::fs::metadata(&scope).map_err(|e| ProjectError::io(&scope, e))?;
        if !metadata.is_dir() {
            return Err(ProjectError::NotADirectory { path: scope });
        }

        let policy = self.policy;
        let walker = WalkDir::new(&scope)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .follow_links(false)
            .process_read_dir(move |_depth, _path, _state, children| {
                // Excluded directories are never descended into.
                children.retain(|child| match child {
                    Ok(entry) => {
                        !(entry.file_type().is_dir()
                            && policy.prunes(&entry.file_name().to_string_lossy()))
                    }
                    Err(_) => true,
                });
            });

        let mut paths = Vec::new();
        let mut records = Vec::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(
                        "Skipping unreadable entry {}: {err}",
                        err.path().map(|p| p.display().to_string()).unwrap_or_default()
                    );
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Ok(rest) = path.strip_prefix(guard.root()) else {
                continue;
            };
            // Lossy names could collide, so they are skipped rather than listed.
            if rest.to_str().is_none() {
                tracing::warn!("Skipping path that is not valid UTF-8: {}", path.display());
                continue;
            }
            let Some(relative) = guard.relativize(&path) else {
                continue;
            };
            if !self.policy.include(&relative) {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if let Some(filter) = &request.name_filter {
                if !filter.matches(&file_name) {
                    continue;
                }
            }
            if let Some(extension) = &request.extension {
                if !has_extension(&file_name, extension) {
                    continue;
                }
            }

            match request.metadata {
                MetadataMode::None => paths.push(relative),
                mode => {
                    let metadata = entry.metadata().map_err(|e| e.to_string());
                    records.push(build_record(relative, metadata, mode));
                }
            }
        }

        if request.metadata.wants_records() {
            records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
            records.dedup_by(|a, b| a.relative_path == b.relative_path);
            tracing::debug!("Enumerated {} files under {}", records.len(), scope.display());
            Ok(Listing::Records(records))
        } else {
            paths.sort();
            paths.dedup();
            tracing::debug!("Enumerated {} files under {}", paths.len(), scope.display());
            Ok(Listing::Paths(paths))
        }
    }
}

/// Build a record from whatever metadata could be read.
fn build_record(
    relative: String,
    metadata: Result<Metadata, String>,
    mode: MetadataMode,
) -> FileRecord {
    match metadata {
        Ok(metadata) => {
            let modified = metadata.modified().unwrap_or_else(|err| {
                tracing::debug!("No modification time for {relative}: {err}");
                UNIX_EPOCH
            });
            let record = FileRecord::new(relative, modified);
            if mode == MetadataMode::ModifiedAndSize {
                record.with_size(metadata.len())
            } else {
                record
            }
        }
        Err(err) => {
            tracing::warn!("Metadata unavailable for {relative}: {err}");
            FileRecord::new(relative, UNIX_EPOCH)
        }
    }
}

fn has_extension(file_name: &str, extension: &str) -> bool {
    file_name
        .strip_suffix(extension)
        .is_some_and(|stem| stem.ends_with('.'))
}
