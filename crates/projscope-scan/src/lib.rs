//! Project file enumeration for projscope.
//!
//! This crate walks a project root and answers "which files are here?"
//! under a fixed set of visibility rules.
//!
//! # Overview
//!
//! - **Root management** via [`RootManager`]: a switchable current root and
//!   an immutable default
//! - **Containment** via [`PathGuard`]: user paths never resolve outside the root
//! - **Exclusion** via [`ExclusionPolicy`]: build output, VCS and IDE state,
//!   dependency caches and compiled artifacts are never listed
//! - **Search** via [`NamePattern`]: `*` and `?` wildcards on base names
//! - **Enumeration** via [`Enumerator`]: sorted relative paths, optionally
//!   with modification time and size
//!
//! # Example
//!
//! ```rust,no_run
//! use projscope_scan::ProjectFiles;
//!
//! let project = ProjectFiles::new("/path/to/project").unwrap();
//! for path in project.list_all().unwrap() {
//!     println!("{path}");
//! }
//!
//! let java = project.search("*.java").unwrap();
//! println!("{} Java files", java.len());
//! ```

mod enumerator;
mod exclusion;
mod guard;
mod pattern;
mod project;
mod root;

pub use enumerator::{EnumerationRequest, Enumerator};
pub use exclusion::{EXCLUDED_DIRS, EXCLUDED_SUFFIXES, ExclusionPolicy};
pub use guard::{PathGuard, normalize, relativize};
pub use pattern::NamePattern;
pub use project::ProjectFiles;
pub use root::RootManager;

// Re-export core types for convenience
pub use projscope_core::{
    FileInfo, FileRecord, Listing, MetadataMode, ProjectConfig, ProjectError, ProjectResult,
};
