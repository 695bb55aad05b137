//! Doctor service - ledger health checks
//!
//! Checks are read-only. They report on the stored document as it is and
//! never repair anything.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::credential::StoredCredential;
use crate::domain::{LedgerSnapshot, TransactionKind};
use crate::ports::LoadOutcome;

use super::ledger::Ledger;

/// Doctor service for health checks
pub struct DoctorService {
    ledger: Arc<Ledger>,
}

impl DoctorService {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Run all health checks
    pub fn run_checks(&self) -> DoctorResult {
        let report = self.ledger.load_report();
        let snapshot = &report.snapshot;
        let mut checks = BTreeMap::new();

        checks.insert("store_load".to_string(), check_load(&report.outcome));
        checks.insert("negative_balances".to_string(), check_negative_balances(snapshot));
        checks.insert("orphaned_logs".to_string(), check_orphaned_logs(snapshot));
        checks.insert("missing_logs".to_string(), check_missing_logs(snapshot));
        checks.insert("non_positive_amounts".to_string(), check_amounts(snapshot));
        checks.insert("unmatched_transfers".to_string(), check_transfers(snapshot));
        checks.insert("plaintext_credentials".to_string(), check_credentials(snapshot));
        checks.insert("unreadable_records".to_string(), check_unreadable(snapshot));

        let passed = checks.values().filter(|c| c.status == CheckStatus::Pass).count();
        let warnings = checks.values().filter(|c| c.status == CheckStatus::Warning).count();
        let errors = checks.values().filter(|c| c.status == CheckStatus::Error).count();

        DoctorResult {
            checks,
            summary: DoctorSummary { passed, warnings, errors },
        }
    }
}

fn check_load(outcome: &LoadOutcome) -> CheckResult {
    match outcome {
        LoadOutcome::Recovered { reason } => CheckResult::warning(
            "Store was partially recovered on load",
            vec![json!({ "reason": reason })],
        ),
        LoadOutcome::Fresh => CheckResult::pass("Store is new and empty"),
        LoadOutcome::Loaded => CheckResult::pass("Store loaded cleanly"),
    }
}

fn check_negative_balances(snapshot: &LedgerSnapshot) -> CheckResult {
    let details: Vec<_> = snapshot
        .users
        .iter()
        .filter(|(_, account)| account.balance < Decimal::ZERO)
        .map(|(id, account)| json!({ "account_id": id, "balance": account.balance.to_string() }))
        .collect();

    if details.is_empty() {
        CheckResult::pass("No negative balances")
    } else {
        CheckResult::error(format!("{} account(s) have a negative balance", details.len()), details)
    }
}

fn check_orphaned_logs(snapshot: &LedgerSnapshot) -> CheckResult {
    let details: Vec<_> = snapshot
        .transactions
        .keys()
        .filter(|id| !snapshot.contains(id))
        .map(|id| json!({ "account_id": id }))
        .collect();

    if details.is_empty() {
        CheckResult::pass("Every log belongs to an account")
    } else {
        CheckResult::warning(format!("{} log(s) reference missing accounts", details.len()), details)
    }
}

fn check_missing_logs(snapshot: &LedgerSnapshot) -> CheckResult {
    let details: Vec<_> = snapshot
        .users
        .keys()
        .filter(|id| !snapshot.transactions.contains_key(*id))
        .map(|id| json!({ "account_id": id }))
        .collect();

    if details.is_empty() {
        CheckResult::pass("Every account has a log")
    } else {
        CheckResult::warning(format!("{} account(s) have no log", details.len()), details)
    }
}

fn check_amounts(snapshot: &LedgerSnapshot) -> CheckResult {
    let details: Vec<_> = snapshot
        .transactions
        .iter()
        .flat_map(|(id, entries)| {
            entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.amount <= Decimal::ZERO)
                .map(move |(i, e)| json!({ "account_id": id, "index": i, "amount": e.amount.to_string() }))
        })
        .collect();

    if details.is_empty() {
        CheckResult::pass("All amounts are positive")
    } else {
        CheckResult::error(format!("{} entr(ies) have a non-positive amount", details.len()), details)
    }
}

/// A `sent` entry with a receipt should have exactly one `received` twin
/// under the counterparty carrying the same receipt and amount. Entries
/// without a receipt predate receipts and are skipped.
fn check_transfers(snapshot: &LedgerSnapshot) -> CheckResult {
    let mut received: HashMap<(Uuid, &str), &crate::domain::TransactionEntry> = HashMap::new();
    for (id, entries) in &snapshot.transactions {
        for entry in entries.iter().filter(|e| e.kind == TransactionKind::Received) {
            if let Some(receipt) = entry.receipt {
                received.insert((receipt, id.as_str()), entry);
            }
        }
    }

    let mut details = Vec::new();
    for (id, entries) in &snapshot.transactions {
        for entry in entries.iter().filter(|e| e.kind == TransactionKind::Sent) {
            let Some(receipt) = entry.receipt else { continue };
            let matched = received
                .get(&(receipt, entry.counterparty.as_str()))
                .is_some_and(|twin| twin.amount == entry.amount && twin.counterparty == *id);
            if !matched {
                details.push(json!({
                    "account_id": id,
                    "receipt": receipt.to_string(),
                    "counterparty": entry.counterparty,
                }));
            }
        }
    }

    if details.is_empty() {
        CheckResult::pass("All transfers have a matching credit")
    } else {
        CheckResult::error(format!("{} transfer(s) have no matching credit", details.len()), details)
    }
}

fn check_credentials(snapshot: &LedgerSnapshot) -> CheckResult {
    let plaintext = snapshot
        .users
        .values()
        .filter(|a| StoredCredential::parse(&a.password).is_plaintext())
        .count();

    if plaintext == 0 {
        CheckResult::pass("All credentials are hashed")
    } else {
        // Ids only in the count; which accounts are weak is not for a report
        CheckResult::warning(
            format!("{} credential(s) stored in plaintext; they upgrade on next login", plaintext),
            vec![json!({ "plaintext_count": plaintext })],
        )
    }
}

/// Records a load could not parse sit under `unreadable` until fixed by hand
fn check_unreadable(snapshot: &LedgerSnapshot) -> CheckResult {
    let (accounts, entries) = snapshot.unreadable_counts();
    if accounts == 0 && entries == 0 {
        CheckResult::pass("No unreadable records")
    } else {
        CheckResult::warning(
            format!("{} account record(s) and {} log entr(ies) could not be read", accounts, entries),
            vec![json!({ "accounts": accounts, "entries": entries })],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Error,
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

impl DoctorResult {
    pub fn is_healthy(&self) -> bool {
        self.summary.errors == 0
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Pass,
            message: message.into(),
            details: None,
        }
    }

    fn warning(message: impl Into<String>, details: Vec<serde_json::Value>) -> Self {
        Self {
            status: CheckStatus::Warning,
            message: message.into(),
            details: Some(details),
        }
    }

    fn error(message: impl Into<String>, details: Vec<serde_json::Value>) -> Self {
        Self {
            status: CheckStatus::Error,
            message: message.into(),
            details: Some(details),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: usize,
    pub warnings: usize,
    pub errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::{Account, Stamp, TransactionEntry};

    fn doctor(snapshot: &LedgerSnapshot) -> DoctorService {
        let store = Arc::new(MemoryStore::with_snapshot(snapshot).unwrap());
        DoctorService::new(Arc::new(Ledger::new(store)))
    }

    fn hashed(snapshot: &mut LedgerSnapshot, id: &str, balance: Decimal) {
        let params = crate::domain::Argon2Params {
            time_cost: 1,
            memory_cost: 8,
            parallelism: 1,
            hash_len: 32,
        };
        let credential = crate::domain::credential::hash_password("pw", &params).unwrap();
        snapshot.open_account(id, Account::new(credential, balance));
    }

    #[test]
    fn test_healthy_ledger() {
        let mut snapshot = LedgerSnapshot::new();
        hashed(&mut snapshot, "alice", Decimal::new(60, 0));
        hashed(&mut snapshot, "bob", Decimal::new(40, 0));
        let stamp = Stamp::now();
        snapshot.append("alice", TransactionEntry::sent("bob", Decimal::new(40, 0), &stamp));
        snapshot.append("bob", TransactionEntry::received("alice", Decimal::new(40, 0), &stamp));

        let result = doctor(&snapshot).run_checks();
        assert!(result.is_healthy());
        assert_eq!(result.summary.warnings, 0);
        assert_eq!(result.checks["unmatched_transfers"].status, CheckStatus::Pass);
    }

    #[test]
    fn test_problems_are_reported() {
        let mut snapshot = LedgerSnapshot::new();
        snapshot.open_account("alice", Account::new("pw", Decimal::new(-5, 0)));
        snapshot.users.insert("bob".into(), Account::new("pw", Decimal::ZERO));
        let stamp = Stamp::now();
        snapshot.append("alice", TransactionEntry::sent("bob", Decimal::new(40, 0), &stamp));
        snapshot.append("ghost", TransactionEntry::topup("Cash at Agent", Decimal::ZERO, None, &stamp));

        let result = doctor(&snapshot).run_checks();
        assert!(!result.is_healthy());
        assert_eq!(result.checks["negative_balances"].status, CheckStatus::Error);
        assert_eq!(result.checks["unmatched_transfers"].status, CheckStatus::Error);
        assert_eq!(result.checks["non_positive_amounts"].status, CheckStatus::Error);
        assert_eq!(result.checks["orphaned_logs"].status, CheckStatus::Warning);
        assert_eq!(result.checks["missing_logs"].status, CheckStatus::Warning);
        assert_eq!(result.checks["plaintext_credentials"].status, CheckStatus::Warning);
        assert_eq!(result.checks["unreadable_records"].status, CheckStatus::Pass);
    }

    #[test]
    fn test_set_aside_records_are_flagged() {
        let (snapshot, _) = LedgerSnapshot::from_document(json!({
            "users": { "alice": { "password": "pw", "balance": "5" } },
            "transactions": { "alice": [ { "type": "refund", "amount": "5" } ] }
        }));

        let result = doctor(&snapshot).run_checks();
        let check = &result.checks["unreadable_records"];
        assert_eq!(check.status, CheckStatus::Warning);
        assert_eq!(check.details.as_ref().unwrap()[0]["entries"], 1);
        assert!(result.is_healthy());
    }
}
