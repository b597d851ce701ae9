//! Tracked file inventory for projscope.
//!
//! This crate keeps a persistent record of every file the project has shown
//! and detects which files are new or changed since the last look.
//!
//! # Reconciliation
//!
//! For each record of a fresh snapshot, in path order:
//!
//! 1. Look up the tracked entry by relative path
//! 2. No entry: record it as **new**
//! 3. Entry older than the file's modification time: refresh it as **updated**
//! 4. Otherwise **unchanged**, nothing is written
//!
//! ```rust,ignore
//! use projscope_inventory::{InventoryReconciler, JsonFileStore};
//! use projscope_scan::ProjectFiles;
//!
//! let project = ProjectFiles::new("/path/to/project").unwrap();
//! let store = JsonFileStore::open("/path/to/tracked_files.jsonl").unwrap();
//! let reconciler = InventoryReconciler::new(store);
//!
//! let report = reconciler.reconcile(&project.list_with_time().unwrap());
//! for item in report.classified() {
//!     println!("{}: {}", item.classification, item.path);
//! }
//! ```
//!
//! # Limitations
//!
//! Entries are never deleted. A file removed from disk keeps its entry, so
//! the inventory can hold paths that no longer exist.
//!
//! Entries are keyed by root-relative path only. A store shared across root
//! switches therefore treats `README.md` under one root and `README.md`
//! under another as the same file.

mod clock;
mod reconcile;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use reconcile::{InventoryReconciler, ReconcileReport, ReconcileSummary, Reconciliation};
pub use store::{JsonFileStore, MemoryStore, StoreError, TrackedFileStore};

// Re-export core types
pub use projscope_core::{Classification, Classified, FileRecord, TrackedFileEntry};
