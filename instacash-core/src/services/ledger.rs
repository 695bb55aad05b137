//! Ledger service - serialized read-modify-write over the store
//!
//! Every mutation runs as: enter gate → take store lock → load a fresh
//! snapshot → run the closure → save if the closure asked to commit. The
//! in-process gate orders threads; the store lock orders processes.

use std::sync::{Arc, Mutex};

use crate::domain::result::StoreError;
use crate::domain::LedgerSnapshot;
use crate::ports::{LedgerStore, LoadReport};

/// What a mutation closure wants done with the snapshot it was handed
#[derive(Debug)]
pub enum Mutation<T> {
    /// Persist the snapshot, then return the value
    Commit(T),
    /// Leave the store untouched
    Discard(T),
}

/// Shared handle to the ledger store
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    gate: Mutex<()>,
}

impl Ledger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            gate: Mutex::new(()),
        }
    }

    /// Fresh read-only snapshot
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.store.load()
    }

    /// Fresh snapshot plus how it was obtained
    pub fn load_report(&self) -> LoadReport {
        self.store.load_report()
    }

    /// Run `f` against a freshly loaded snapshot inside the critical section
    ///
    /// If `f` returns an error or `Mutation::Discard`, nothing is written.
    /// `f` must finish all validation before it touches the snapshot; an
    /// error returned after mutating is still discarded, but that is a bug
    /// in the caller rather than something this method hides.
    pub fn transact<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut LedgerSnapshot) -> Result<Mutation<T>, E>,
    {
        let _gate = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        let _lock = self.store.lock()?;

        let mut snapshot = self.store.load();
        match f(&mut snapshot)? {
            Mutation::Commit(value) => {
                self.store.save(&snapshot)?;
                Ok(value)
            }
            Mutation::Discard(value) => Ok(value),
        }
    }
}
