//! JSON document ledger store
//!
//! The whole ledger lives in one pretty-printed JSON file. Saves go through a
//! temp file in the same directory followed by a rename, so readers never
//! observe a half-written document. Cross-process serialization uses an
//! exclusive lock on a sidecar `<file>.lock`.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tempfile::NamedTempFile;

use crate::domain::result::StoreError;
use crate::domain::LedgerSnapshot;
use crate::ports::{LedgerStore, LoadReport, StoreLock};

/// Ledger store backed by a single JSON document
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the JSON document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sidecar file used for the exclusive lock
    pub fn lock_path(&self) -> PathBuf {
        self.sibling("lock")
    }

    /// Where an unreadable document is copied before it can be overwritten
    pub fn corrupt_copy_path(&self) -> PathBuf {
        self.sibling("corrupt")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(".");
        name.push(suffix);
        PathBuf::from(name)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Keep a copy of the unusable document and build the recovery report
    fn recover(&self, snapshot: LedgerSnapshot, reason: String) -> LoadReport {
        let copy = self.corrupt_copy_path();
        match fs::copy(&self.path, &copy) {
            Ok(_) => eprintln!(
                "[instacash] Ledger at {} could not be fully read ({}); preserved a copy at {}",
                self.path.display(),
                reason,
                copy.display()
            ),
            Err(e) => eprintln!(
                "[instacash] Ledger at {} could not be fully read ({}); copy failed: {}",
                self.path.display(),
                reason,
                e
            ),
        }
        LoadReport::recovered(snapshot, reason)
    }
}

impl LedgerStore for JsonFileStore {
    fn load_report(&self) -> LoadReport {
        if !self.path.exists() {
            return LoadReport::fresh(LedgerSnapshot::new());
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => return self.recover(LedgerSnapshot::new(), format!("unreadable: {}", e)),
        };

        let document: JsonValue = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => return self.recover(LedgerSnapshot::new(), format!("invalid JSON: {}", e)),
        };

        let (snapshot, problems) = LedgerSnapshot::from_document(document);
        if problems.is_empty() {
            LoadReport::loaded(snapshot)
        } else {
            self.recover(snapshot, problems.join("; "))
        }
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::unavailable(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let mut temp = NamedTempFile::new_in(&dir)
            .map_err(|e| StoreError::unavailable(format!("Failed to create temp file: {}", e)))?;

        serde_json::to_writer_pretty(&mut temp, snapshot)
            .map_err(|e| StoreError::unavailable(format!("Failed to serialize ledger: {}", e)))?;
        temp.write_all(b"\n")
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| StoreError::unavailable(format!("Failed to write ledger: {}", e)))?;

        temp.persist(&self.path).map_err(|e| {
            StoreError::unavailable(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e.error
            ))
        })?;

        Ok(())
    }

    fn lock(&self) -> Result<StoreLock, StoreError> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::unavailable(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| {
                StoreError::unavailable(format!("Failed to open {}: {}", lock_path.display(), e))
            })?;

        StoreLock::exclusive(file)
    }

    fn create_if_missing(&self) -> Result<bool, StoreError> {
        let _lock = self.lock()?;
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&LedgerSnapshot::new())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, Stamp, TransactionEntry};
    use crate::ports::LoadOutcome;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    #[test]
    fn test_first_load_does_not_write() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("wallet.json"));

        let report = store.load_report();
        assert_eq!(report.outcome, LoadOutcome::Fresh);
        assert!(report.snapshot.users.is_empty());
        assert!(!store.path().exists());

        assert!(store.create_if_missing().unwrap());
        assert_eq!(store.load_report().outcome, LoadOutcome::Loaded);
        assert!(!store.create_if_missing().unwrap());
    }

    #[test]
    fn test_create_if_missing_keeps_committed_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let reader = JsonFileStore::new(&path);
        let writer = JsonFileStore::new(&path);

        // The reader saw nothing, then a writer committed before it got
        // round to creating the file
        assert_eq!(reader.load_report().outcome, LoadOutcome::Fresh);
        let mut snapshot = LedgerSnapshot::new();
        snapshot.open_account("alice", Account::new("pw1", Decimal::ZERO));
        {
            let _lock = writer.lock().unwrap();
            writer.save(&snapshot).unwrap();
        }

        assert!(!reader.create_if_missing().unwrap());
        assert!(reader.load().contains("alice"));
    }

    #[test]
    fn test_bad_entry_is_set_aside_and_rest_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        fs::write(
            &path,
            r#"{"users": {"bob": {"password": "pw2", "balance": "40"}},
                "transactions": {"bob": [
                    {"type": "received", "amount": "40", "from": "alice", "timestamp": "2024-05-01 10:00:00"},
                    {"type": "refund", "amount": "5"}
                ]}}"#,
        )
        .unwrap();
        let store = JsonFileStore::new(&path);

        let report = store.load_report();
        assert!(report.outcome.is_recovered());
        assert_eq!(report.snapshot.entries("bob").len(), 1);
        assert!(store.corrupt_copy_path().exists());

        store.save(&report.snapshot).unwrap();
        let report = store.load_report();
        assert_eq!(report.outcome, LoadOutcome::Loaded);
        assert_eq!(report.snapshot.unreadable_counts(), (0, 1));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("wallet.json"));

        let mut snapshot = LedgerSnapshot::new();
        snapshot.open_account("alice", Account::new("pw1", Decimal::new(10050, 2)));
        snapshot.append(
            "alice",
            TransactionEntry::topup("Bank Transfer", Decimal::new(10050, 2), None, &Stamp::now()),
        );
        store.save(&snapshot).unwrap();

        assert_eq!(store.load(), snapshot);
    }

    #[test]
    fn test_corrupt_document_is_preserved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);

        let report = store.load_report();
        assert!(report.outcome.is_recovered());
        assert!(report.snapshot.users.is_empty());

        let copy = fs::read_to_string(store.corrupt_copy_path()).unwrap();
        assert_eq!(copy, "{ not json");
    }

    #[test]
    fn test_lock_can_be_reacquired_after_drop() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("wallet.json"));

        {
            let _guard = store.lock().unwrap();
        }
        let _guard = store.lock().unwrap();
        assert!(store.lock_path().exists());
    }
}
