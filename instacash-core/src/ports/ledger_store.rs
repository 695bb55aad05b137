//! Ledger store port - persistence abstraction

use std::fs::File;

use fs2::FileExt;
use serde::Serialize;

use crate::domain::result::StoreError;
use crate::domain::LedgerSnapshot;

/// Persistent home of the ledger snapshot
///
/// The whole snapshot is read and written as one unit; there is no partial
/// load or save. Implementations never fail a load: a missing, unreadable or
/// corrupt medium yields an empty (or partially empty) snapshot and says so
/// in the `LoadOutcome`. Loads never write; only `save` and
/// `create_if_missing` do.
pub trait LedgerStore: Send + Sync {
    /// Load the snapshot and report how it was obtained
    fn load_report(&self) -> LoadReport;

    /// Load the snapshot
    fn load(&self) -> LedgerSnapshot {
        self.load_report().snapshot
    }

    /// Replace the stored snapshot
    ///
    /// A subsequent `load` sees either the old document or the new one,
    /// never a mix.
    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError>;

    /// Enter the store's critical section
    ///
    /// Held across a load/mutate/save cycle. Released when the guard drops.
    fn lock(&self) -> Result<StoreLock, StoreError>;

    /// Write an empty document if the medium does not exist yet
    ///
    /// Takes `lock()` itself, so it must not be called while the caller
    /// already holds the store lock. Returns true when it created the medium.
    fn create_if_missing(&self) -> Result<bool, StoreError> {
        Ok(false)
    }
}

/// How a load obtained its snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Nothing stored yet (first run)
    Fresh,
    /// Read normally
    Loaded,
    /// The medium could not be fully used; unreadable records were set aside
    /// or the whole document was replaced by an empty one
    Recovered { reason: String },
}

impl LoadOutcome {
    pub fn is_recovered(&self) -> bool {
        matches!(self, LoadOutcome::Recovered { .. })
    }
}

/// Result of `LedgerStore::load_report`
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub snapshot: LedgerSnapshot,
    pub outcome: LoadOutcome,
}

impl LoadReport {
    pub fn fresh(snapshot: LedgerSnapshot) -> Self {
        Self {
            snapshot,
            outcome: LoadOutcome::Fresh,
        }
    }

    pub fn loaded(snapshot: LedgerSnapshot) -> Self {
        Self {
            snapshot,
            outcome: LoadOutcome::Loaded,
        }
    }

    pub fn recovered(snapshot: LedgerSnapshot, reason: impl Into<String>) -> Self {
        Self {
            snapshot,
            outcome: LoadOutcome::Recovered {
                reason: reason.into(),
            },
        }
    }
}

/// Guard for a store's critical section
///
/// File-backed stores hold an exclusive OS lock on a sidecar file; other
/// stores rely on the in-process gate alone and hand out an empty guard.
#[derive(Debug)]
pub struct StoreLock {
    file: Option<File>,
}

impl StoreLock {
    /// Guard that holds nothing
    pub fn none() -> Self {
        Self { file: None }
    }

    /// Take an exclusive lock on `file`, blocking until it is available
    pub fn exclusive(file: File) -> Result<Self, StoreError> {
        FileExt::lock_exclusive(&file)
            .map_err(|e| StoreError::unavailable(format!("Failed to lock ledger: {}", e)))?;
        Ok(Self { file: Some(file) })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = FileExt::unlock(file);
        }
    }
}
