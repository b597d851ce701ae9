use chrono::{TimeZone, Utc};
use projscope_inventory::{
    Classification, InventoryReconciler, JsonFileStore, ManualClock, MemoryStore, StoreError,
    TrackedFileEntry, TrackedFileStore,
};
use projscope_scan::ProjectFiles;
use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

/// Store wrapper that counts every save.
struct CountingStore {
    inner: MemoryStore,
    saves: Cell<usize>,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            saves: Cell::new(0),
        }
    }
}

impl TrackedFileStore for CountingStore {
    fn find_by_path(&self, path: &str) -> Result<Option<TrackedFileEntry>, StoreError> {
        self.inner.find_by_path(path)
    }

    fn save(&self, entry: TrackedFileEntry) -> Result<TrackedFileEntry, StoreError> {
        self.saves.set(self.saves.get() + 1);
        self.inner.save(entry)
    }

    fn entries(&self) -> Result<Vec<TrackedFileEntry>, StoreError> {
        self.inner.entries()
    }
}

fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

#[test]
fn test_end_to_end_scenario() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("target")).unwrap();
    fs::write(root.join("a/b.java"), "class B {}").unwrap();
    fs::write(root.join("target/Gen.class"), [0xca, 0xfe]).unwrap();
    set_mtime(&root.join("a/b.java"), at(1_600_000_000));

    let project = ProjectFiles::new(root).unwrap();
    assert_eq!(project.list_all().unwrap(), vec!["a/b.java"]);

    let store = MemoryStore::new();
    let reconciler = InventoryReconciler::new(&store);

    let first = reconciler
        .try_reconcile(&project.list_with_time().unwrap())
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].path, "a/b.java");
    assert_eq!(first[0].classification, Classification::New);
    assert_eq!(store.len(), 1);

    set_mtime(&root.join("a/b.java"), at(1_700_000_000));
    let second = reconciler
        .try_reconcile(&project.list_with_time().unwrap())
        .unwrap();
    assert_eq!(second[0].classification, Classification::Updated);

    let entry = store.find_by_path("a/b.java").unwrap().unwrap();
    assert_eq!(entry.last_modified_time.timestamp(), 1_700_000_000);
}

#[test]
fn test_second_pass_on_unchanged_tree_writes_nothing() {
    let temp = TempDir::new().unwrap();
    for name in ["one.txt", "two.txt", "dir/three.txt"] {
        let path = temp.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, name).unwrap();
    }

    let project = ProjectFiles::new(temp.path()).unwrap();
    let store = CountingStore::new();
    let reconciler = InventoryReconciler::new(&store);

    let first = reconciler.reconcile(&project.list_with_time().unwrap());
    assert_eq!(first.summary().new, 3);
    assert_eq!(store.saves.get(), 3);

    let second = reconciler.reconcile(&project.list_with_time().unwrap());
    assert_eq!(second.summary().unchanged, 3);
    assert!(second
        .classified()
        .all(|c| c.classification == Classification::Unchanged));
    assert_eq!(store.saves.get(), 3);
}

#[test]
fn test_older_mtime_is_unchanged() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("notes.md");
    fs::write(&file, "v1").unwrap();
    set_mtime(&file, at(2_000));

    let project = ProjectFiles::new(temp.path()).unwrap();
    let store = CountingStore::new();
    let reconciler = InventoryReconciler::new(&store);
    reconciler.reconcile(&project.list_with_time().unwrap());

    set_mtime(&file, at(1_000));
    let report = reconciler.reconcile(&project.list_with_time().unwrap());
    assert_eq!(report.summary().unchanged, 1);
    assert_eq!(store.saves.get(), 1);

    let entry = store.find_by_path("notes.md").unwrap().unwrap();
    assert_eq!(entry.last_modified_time.timestamp(), 2_000);
}

#[test]
fn test_vanished_files_keep_stale_entries() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("keep.txt"), "k").unwrap();
    fs::write(temp.path().join("gone.txt"), "g").unwrap();

    let project = ProjectFiles::new(temp.path()).unwrap();
    let store = MemoryStore::new();
    let reconciler = InventoryReconciler::new(&store);
    reconciler.reconcile(&project.list_with_time().unwrap());

    fs::remove_file(temp.path().join("gone.txt")).unwrap();
    let report = reconciler.reconcile(&project.list_with_time().unwrap());
    assert_eq!(report.outcomes.len(), 1);

    // Known limitation: the inventory only grows.
    assert!(store.find_by_path("gone.txt").unwrap().is_some());
    assert_eq!(store.len(), 2);
}

#[test]
fn test_tracked_at_uses_clock() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "a").unwrap();
    set_mtime(&temp.path().join("a.txt"), at(100));

    let project = ProjectFiles::new(temp.path()).unwrap();
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc.timestamp_opt(5_000, 0).unwrap());
    let reconciler = InventoryReconciler::with_clock(&store, &clock);

    reconciler.reconcile(&project.list_with_time().unwrap());
    assert_eq!(
        store.find_by_path("a.txt").unwrap().unwrap().tracked_at.timestamp(),
        5_000
    );

    clock.advance(Duration::from_secs(10));
    set_mtime(&temp.path().join("a.txt"), at(200));
    reconciler.reconcile(&project.list_with_time().unwrap());
    let entry = store.find_by_path("a.txt").unwrap().unwrap();
    assert_eq!(entry.tracked_at.timestamp(), 5_010);
    assert_eq!(entry.last_modified_time.timestamp(), 200);
}

#[test]
fn test_json_store_persists_between_sessions() {
    let project_dir = TempDir::new().unwrap();
    let state_dir = TempDir::new().unwrap();
    let store_path = state_dir.path().join("tracked_files.jsonl");
    fs::write(project_dir.path().join("a.txt"), "a").unwrap();

    let project = ProjectFiles::new(project_dir.path()).unwrap();
    {
        let reconciler = InventoryReconciler::new(JsonFileStore::open(&store_path).unwrap());
        let report = reconciler.reconcile(&project.list_with_time().unwrap());
        assert_eq!(report.summary().new, 1);
    }

    let reconciler = InventoryReconciler::new(JsonFileStore::open(&store_path).unwrap());
    let report = reconciler.reconcile(&project.list_with_time().unwrap());
    assert_eq!(report.summary().unchanged, 1);
    assert!(reconciler.store().path().exists());
}

#[test]
fn test_switched_roots_share_entries_by_relative_path() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();
    fs::write(first.join("README.md"), "one").unwrap();
    fs::write(second.join("README.md"), "two").unwrap();
    set_mtime(&first.join("README.md"), at(1_000));
    set_mtime(&second.join("README.md"), at(500));

    let project = ProjectFiles::new(&first).unwrap();
    let store = MemoryStore::new();
    let reconciler = InventoryReconciler::new(&store);
    reconciler.reconcile(&project.list_with_time().unwrap());

    // Known limitation: the other root's README.md maps onto the same entry.
    project.switch_root(&second).unwrap();
    let report = reconciler.reconcile(&project.list_with_time().unwrap());
    assert_eq!(report.summary().unchanged, 1);
    assert_eq!(store.len(), 1);
}
