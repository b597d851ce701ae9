//! File records, tracked entries and classification types.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How much metadata an enumeration collects per file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataMode {
    /// Bare relative paths.
    #[default]
    None,
    /// Paths with modification time.
    ModifiedOnly,
    /// Paths with modification time and size.
    ModifiedAndSize,
}

impl MetadataMode {
    /// Whether this mode produces [`FileRecord`] values.
    pub fn wants_records(self) -> bool {
        !matches!(self, MetadataMode::None)
    }
}

/// A file observed during enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Root-relative path with `/` separators.
    pub relative_path: String,
    /// Last modification time, `UNIX_EPOCH` when it could not be read.
    pub modified: SystemTime,
    /// Size in bytes, when collected.
    pub size: Option<u64>,
}

impl FileRecord {
    /// Create a record without size information.
    pub fn new(relative_path: impl Into<String>, modified: SystemTime) -> Self {
        Self {
            relative_path: relative_path.into(),
            modified,
            size: None,
        }
    }

    /// Attach a size to this record.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Base name of the file.
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }

    /// Whether the modification time is the "unknown" sentinel.
    pub fn modified_unknown(&self) -> bool {
        self.modified == UNIX_EPOCH
    }

    /// Modification time as a UTC timestamp.
    pub fn modified_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.modified)
    }
}

/// Result of an enumeration, shaped by the requested [`MetadataMode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing {
    /// Bare relative paths, sorted.
    Paths(Vec<String>),
    /// Records with metadata, sorted by relative path.
    Records(Vec<FileRecord>),
}

impl Listing {
    /// Number of files in the listing.
    pub fn len(&self) -> usize {
        match self {
            Listing::Paths(paths) => paths.len(),
            Listing::Records(records) => records.len(),
        }
    }

    /// Whether the listing is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Relative paths in listing order.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Listing::Paths(paths) => paths.iter().map(String::as_str).collect(),
            Listing::Records(records) => {
                records.iter().map(|r| r.relative_path.as_str()).collect()
            }
        }
    }

    /// Consume into bare paths.
    pub fn into_paths(self) -> Vec<String> {
        match self {
            Listing::Paths(paths) => paths,
            Listing::Records(records) => records.into_iter().map(|r| r.relative_path).collect(),
        }
    }

    /// Consume into records; `None` for a path-only listing.
    pub fn into_records(self) -> Option<Vec<FileRecord>> {
        match self {
            Listing::Paths(_) => None,
            Listing::Records(records) => Some(records),
        }
    }
}

/// Surrogate identity assigned by a tracking store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl EntryId {
    /// Create a new EntryId from a u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Persisted record of a file's last observed modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFileEntry {
    /// Store-assigned id; `None` until first saved.
    #[serde(default)]
    pub id: Option<EntryId>,
    /// Root-relative path, unique within a store.
    pub file_path: String,
    /// Modification time recorded at the last observation.
    pub last_modified_time: DateTime<Utc>,
    /// When this entry was created or last refreshed.
    pub tracked_at: DateTime<Utc>,
}

impl TrackedFileEntry {
    /// Create an unsaved entry.
    pub fn new(
        file_path: impl Into<String>,
        last_modified_time: DateTime<Utc>,
        tracked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            file_path: file_path.into(),
            last_modified_time,
            tracked_at,
        }
    }

    /// Whether the store has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// How a reconciled file compares to its tracked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// No entry existed; one was created.
    New,
    /// The file is newer than its entry; the entry was refreshed.
    Updated,
    /// Nothing to record.
    Unchanged,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Classification::New => "NEW FILE",
            Classification::Updated => "UPDATED",
            Classification::Unchanged => "UNCHANGED",
        };
        f.write_str(label)
    }
}

/// A path together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classified {
    pub path: String,
    pub classification: Classification,
}

/// Size and access information for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub relative_path: String,
    pub size: u64,
    pub readable: bool,
    pub writable: bool,
}
