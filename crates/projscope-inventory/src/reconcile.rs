//! Reconciliation of on-disk snapshots against tracked entries.

use serde::Serialize;

use projscope_core::{
    Classification, Classified, FileRecord, ProjectError, ProjectResult, TrackedFileEntry,
};

use crate::clock::{Clock, SystemClock};
use crate::store::TrackedFileStore;

/// Outcome of reconciling one path.
#[derive(Debug)]
pub struct Reconciliation {
    /// Root-relative path.
    pub path: String,
    /// Classification, or the store failure for this path.
    pub result: ProjectResult<Classification>,
}

/// Per-classification counts for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl ReconcileSummary {
    /// Paths that caused a write.
    pub fn changed(&self) -> usize {
        self.new + self.updated
    }

    /// Paths processed, including failures.
    pub fn total(&self) -> usize {
        self.new + self.updated + self.unchanged + self.failed
    }
}

/// Every outcome of a reconciliation pass, in snapshot order.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub outcomes: Vec<Reconciliation>,
}

impl ReconcileReport {
    /// Successfully classified paths.
    pub fn classified(&self) -> impl Iterator<Item = Classified> + '_ {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(classification) => Some(Classified {
                path: o.path.clone(),
                classification: *classification,
            }),
            Err(_) => None,
        })
    }

    /// Paths that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ProjectError)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.path.as_str(), e)))
    }

    /// Counts per classification.
    pub fn summary(&self) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        for outcome in &self.outcomes {
            match outcome.result {
                Ok(Classification::New) => summary.new += 1,
                Ok(Classification::Updated) => summary.updated += 1,
                Ok(Classification::Unchanged) => summary.unchanged += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Whether every path was processed without a store failure.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// Classifies snapshot records as new, updated or unchanged and upserts the store.
///
/// Entries for paths missing from a snapshot are never removed, so the
/// inventory only grows.
pub struct InventoryReconciler<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: TrackedFileStore> InventoryReconciler<S> {
    /// Create a reconciler using the system clock.
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: TrackedFileStore, C: Clock> InventoryReconciler<S, C> {
    /// Create a reconciler with a custom clock.
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconcile one record: one lookup, then at most one save.
    pub fn reconcile_record(&self, record: &FileRecord) -> ProjectResult<Classification> {
        let path = record.relative_path.as_str();
        let observed = record.modified_utc();

        let existing = self
            .store
            .find_by_path(path)
            .map_err(|e| ProjectError::persistence(path, e))?;

        let classification = match existing {
            None => {
                let entry = TrackedFileEntry::new(path, observed, self.clock.now());
                self.store
                    .save(entry)
                    .map_err(|e| ProjectError::persistence(path, e))?;
                Classification::New
            }
            Some(mut entry) if observed > entry.last_modified_time => {
                entry.last_modified_time = observed;
                entry.tracked_at = self.clock.now();
                self.store
                    .save(entry)
                    .map_err(|e| ProjectError::persistence(path, e))?;
                Classification::Updated
            }
            Some(_) => Classification::Unchanged,
        };

        tracing::debug!("{classification}: {path}");
        Ok(classification)
    }

    /// Reconcile a snapshot, continuing past per-path failures.
    pub fn reconcile(&self, snapshot: &[FileRecord]) -> ReconcileReport {
        let outcomes: Vec<Reconciliation> = snapshot
            .iter()
            .map(|record| Reconciliation {
                path: record.relative_path.clone(),
                result: self.reconcile_record(record),
            })
            .collect();

        let report = ReconcileReport { outcomes };
        let summary = report.summary();
        tracing::info!(
            "Reconciled {} files: {} new, {} updated, {} unchanged, {} failed",
            summary.total(),
            summary.new,
            summary.updated,
            summary.unchanged,
            summary.failed
        );
        for (path, error) in report.failures() {
            tracing::warn!("Failed to track {path}: {error}");
        }
        report
    }

    /// Reconcile a snapshot, stopping at the first failure.
    ///
    /// Writes already made for earlier paths are kept.
    pub fn try_reconcile(&self, snapshot: &[FileRecord]) -> ProjectResult<Vec<Classified>> {
        snapshot
            .iter()
            .map(|record| {
                self.reconcile_record(record).map(|classification| Classified {
                    path: record.relative_path.clone(),
                    classification,
                })
            })
            .collect()
    }
}
