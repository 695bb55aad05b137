//! In-memory ledger store
//!
//! Holds the snapshot as serialized JSON so every load hands out an
//! independent copy, exactly like a file-backed store would.

use std::sync::Mutex;

use crate::domain::result::StoreError;
use crate::domain::LedgerSnapshot;
use crate::ports::{LedgerStore, LoadReport, StoreLock};

/// Ledger store that lives only as long as the process
#[derive(Default)]
pub struct MemoryStore {
    document: Mutex<Option<serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot
    pub fn with_snapshot(snapshot: &LedgerSnapshot) -> Result<Self, StoreError> {
        let store = Self::new();
        store.save(snapshot)?;
        Ok(store)
    }
}

impl LedgerStore for MemoryStore {
    fn load_report(&self) -> LoadReport {
        let guard = self.document.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            None => LoadReport::fresh(LedgerSnapshot::new()),
            Some(document) => {
                let (snapshot, problems) = LedgerSnapshot::from_document(document.clone());
                if problems.is_empty() {
                    LoadReport::loaded(snapshot)
                } else {
                    LoadReport::recovered(snapshot, problems.join("; "))
                }
            }
        }
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        let document = serde_json::to_value(snapshot)
            .map_err(|e| StoreError::unavailable(format!("Failed to serialize ledger: {}", e)))?;
        let mut guard = self
            .document
            .lock()
            .map_err(|e| StoreError::unavailable(format!("Lock poisoned: {}", e)))?;
        *guard = Some(document);
        Ok(())
    }

    fn lock(&self) -> Result<StoreLock, StoreError> {
        Ok(StoreLock::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Account;
    use crate::ports::LoadOutcome;
    use rust_decimal::Decimal;

    #[test]
    fn test_fresh_then_loaded() {
        let store = MemoryStore::new();
        assert_eq!(store.load_report().outcome, LoadOutcome::Fresh);

        let mut snapshot = LedgerSnapshot::new();
        snapshot.open_account("bob", Account::new("pw2", Decimal::ZERO));
        store.save(&snapshot).unwrap();

        let report = store.load_report();
        assert_eq!(report.outcome, LoadOutcome::Loaded);
        assert_eq!(report.snapshot, snapshot);
    }

    #[test]
    fn test_loads_are_independent_copies() {
        let store = MemoryStore::new();
        let mut first = store.load();
        first.open_account("bob", Account::new("pw2", Decimal::ZERO));
        assert!(store.load().users.is_empty());
    }
}
