//! Tracked-file stores.
//!
//! [`TrackedFileStore`] is the request/response contract the reconciler
//! sequences against: one lookup by path, then at most one save. Two
//! implementations are provided: [`MemoryStore`] for ephemeral use and
//! [`JsonFileStore`], which keeps the inventory in a JSON Lines log.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use projscope_core::{EntryId, TrackedFileEntry};

/// Errors raised by a tracking store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Inserting would duplicate an existing path.
    #[error("Path already tracked: {path}")]
    DuplicatePath { path: String },

    /// Updating an entry whose id the store does not know.
    #[error("Unknown entry id {id} for {path}")]
    UnknownId { id: u64, path: String },

    /// Reading or writing the backing file failed.
    #[error("Store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file could not be encoded or decoded.
    #[error("Store format error at {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Store-specific failure.
    #[error("{message}")]
    Other { message: String },
}

/// Lookup/upsert contract for tracked file entries, keyed by path.
pub trait TrackedFileStore {
    /// Find the entry for a root-relative path.
    fn find_by_path(&self, path: &str) -> Result<Option<TrackedFileEntry>, StoreError>;

    /// Insert (when `id` is `None`) or update (by `id`) an entry.
    ///
    /// Returns the stored entry, with its id assigned on insert.
    fn save(&self, entry: TrackedFileEntry) -> Result<TrackedFileEntry, StoreError>;

    /// All entries, sorted by path.
    fn entries(&self) -> Result<Vec<TrackedFileEntry>, StoreError>;
}

impl<S: TrackedFileStore + ?Sized> TrackedFileStore for &S {
    fn find_by_path(&self, path: &str) -> Result<Option<TrackedFileEntry>, StoreError> {
        (**self).find_by_path(path)
    }

    fn save(&self, entry: TrackedFileEntry) -> Result<TrackedFileEntry, StoreError> {
        (**self).save(entry)
    }

    fn entries(&self) -> Result<Vec<TrackedFileEntry>, StoreError> {
        (**self).entries()
    }
}

/// Entries keyed by path plus the id counter.
#[derive(Debug, Default, Clone)]
struct Inventory {
    next_id: u64,
    entries: BTreeMap<String, TrackedFileEntry>,
}

impl Inventory {
    /// Check an entry against the current state and assign its id, without applying it.
    fn stage(&self, mut entry: TrackedFileEntry) -> Result<TrackedFileEntry, StoreError> {
        match entry.id {
            None => {
                if self.entries.contains_key(&entry.file_path) {
                    return Err(StoreError::DuplicatePath {
                        path: entry.file_path,
                    });
                }
                entry.id = Some(EntryId::new(self.next_id + 1));
            }
            Some(id) => {
                let known = self
                    .entries
                    .get(&entry.file_path)
                    .is_some_and(|existing| existing.id == Some(id));
                if !known {
                    return Err(StoreError::UnknownId {
                        id: id.0,
                        path: entry.file_path,
                    });
                }
            }
        }
        Ok(entry)
    }

    fn commit(&mut self, entry: TrackedFileEntry) {
        if let Some(id) = entry.id {
            self.next_id = self.next_id.max(id.0);
        }
        self.entries.insert(entry.file_path.clone(), entry);
    }

    fn upsert(&mut self, entry: TrackedFileEntry) -> Result<TrackedFileEntry, StoreError> {
        let staged = self.stage(entry)?;
        self.commit(staged.clone());
        Ok(staged)
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inventory>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked entries.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TrackedFileStore for MemoryStore {
    fn find_by_path(&self, path: &str) -> Result<Option<TrackedFileEntry>, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.entries.get(path).cloned())
    }

    fn save(&self, entry: TrackedFileEntry) -> Result<TrackedFileEntry, StoreError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.upsert(entry)
    }

    fn entries(&self) -> Result<Vec<TrackedFileEntry>, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.entries.values().cloned().collect())
    }
}

#[derive(Debug, Default)]
struct LogState {
    inventory: Inventory,
    /// Append handle, opened on the first save.
    log: Option<File>,
}

/// Store persisted as a JSON Lines log, one entry per line.
///
/// Every save appends the saved entry as a single line, so a save costs the
/// same however large the inventory is. On open the log is replayed (later
/// lines win for the same path) and compacted to one line per entry through a
/// temporary sibling file and a rename. An append cut short by a crash leaves
/// an unterminated last line, which replay drops, so each path comes back in
/// its state before or after the interrupted save.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<LogState>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inventory = match fs::read_to_string(&path) {
            Ok(text) => {
                let inventory = replay(&path, &text)?;
                compact(&path, &inventory)?;
                tracing::debug!(
                    "Loaded {} tracked entries from {}",
                    inventory.entries.len(),
                    path.display()
                );
                inventory
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Inventory::default(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self {
            path,
            state: RwLock::new(LogState {
                inventory,
                log: None,
            }),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, log: &mut Option<File>, line: &[u8]) -> Result<(), StoreError> {
        if log.is_none() {
            create_parent(&self.path)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|source| StoreError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            *log = Some(file);
        }
        if let Some(file) = log {
            file.write_all(line).map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl TrackedFileStore for JsonFileStore {
    fn find_by_path(&self, path: &str) -> Result<Option<TrackedFileEntry>, StoreError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.inventory.entries.get(path).cloned())
    }

    fn save(&self, entry: TrackedFileEntry) -> Result<TrackedFileEntry, StoreError> {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;

        let staged = state.inventory.stage(entry)?;
        let line = encode_line(&self.path, &staged)?;
        self.append(&mut state.log, &line)?;
        state.inventory.commit(staged.clone());
        Ok(staged)
    }

    fn entries(&self) -> Result<Vec<TrackedFileEntry>, StoreError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.inventory.entries.values().cloned().collect())
    }
}

fn encode_line(path: &Path, entry: &TrackedFileEntry) -> Result<Vec<u8>, StoreError> {
    let mut line = serde_json::to_vec(entry).map_err(|source| StoreError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    line.push(b'\n');
    Ok(line)
}

/// Rebuild the inventory from a log.
///
/// An unparsable line is a format error, except an unterminated last line,
/// which is an append that never finished.
fn replay(path: &Path, text: &str) -> Result<Inventory, StoreError> {
    let mut inventory = Inventory::default();
    let terminated = text.is_empty() || text.ends_with('\n');
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TrackedFileEntry>(line) {
            Ok(mut entry) => {
                if entry.id.is_none() {
                    entry.id = Some(EntryId::new(inventory.next_id + 1));
                }
                inventory.commit(entry);
            }
            Err(_) if !terminated && lines.peek().is_none() => {
                tracing::warn!("Dropping incomplete last record in {}", path.display());
            }
            Err(source) => {
                return Err(StoreError::Format {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }
    Ok(inventory)
}

/// Rewrite the log with one line per entry, via a temporary file and a rename.
fn compact(path: &Path, inventory: &Inventory) -> Result<(), StoreError> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    let staging_err = |source| StoreError::Io {
        path: staging.clone(),
        source,
    };

    let file = File::create(&staging).map_err(staging_err)?;
    let mut writer = BufWriter::new(file);
    for entry in inventory.entries.values() {
        writer
            .write_all(&encode_line(path, entry)?)
            .map_err(staging_err)?;
    }
    writer.flush().map_err(staging_err)?;
    drop(writer);

    fs::rename(&staging, path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn create_parent(path: &Path) -> Result<(), StoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
