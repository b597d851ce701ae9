//! Core types for projscope.
//!
//! This crate provides the data structures shared by the scanning and
//! inventory crates: file records, tracked entries, error kinds and the
//! startup configuration.

mod config;
mod error;
mod record;

pub use config::{APP_DIR, ProjectConfig, ProjectConfigBuilder, STORE_FILE};
pub use error::{ErrorKind, ProjectError, ProjectResult};
pub use record::{
    Classification, Classified, EntryId, FileInfo, FileRecord, Listing, MetadataMode,
    TrackedFileEntry,
};
