//! Integration tests for instacash-core services
//!
//! Every test runs against a real JSON ledger in a temp directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use tempfile::TempDir;

use instacash_core::adapters::json_file::JsonFileStore;
use instacash_core::config::Config;
use instacash_core::domain::Argon2Params;
use instacash_core::ports::{LedgerStore, LoadOutcome};
use instacash_core::services::{HistoryFilter, Screen, SessionState};
use instacash_core::{
    AccountError, AuthError, LedgerSnapshot, MoneyError, ReferenceField, TransactionKind,
    WalletContext, LEDGER_FILE,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn test_config() -> Config {
    let mut config = Config::default();
    config.password_hashing = Argon2Params {
        time_cost: 1,
        memory_cost: 8,
        parallelism: 1,
        hash_len: 32,
    };
    config
}

fn open_wallet(dir: &Path) -> WalletContext {
    let store = Arc::new(JsonFileStore::new(dir.join(LEDGER_FILE)));
    WalletContext::with_store(test_config(), store)
}

fn read_ledger_bytes(dir: &Path) -> Vec<u8> {
    std::fs::read(dir.join(LEDGER_FILE)).expect("ledger file should exist")
}

fn dollars(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

/// Registers alice and bob, tops alice up with 100 and sends 40 to bob
fn seeded_wallet(dir: &Path) -> WalletContext {
    let ctx = open_wallet(dir);
    ctx.registry_service.register("alice", "pw1").unwrap();
    ctx.registry_service.register("bob", "pw2").unwrap();
    ctx.movement_service
        .top_up("alice", dollars(100), "Bank Transfer", None)
        .unwrap();
    ctx.movement_service
        .transfer("alice", "bob", dollars(40))
        .unwrap();
    ctx
}

// ============================================================================
// Wallet scenarios
// ============================================================================

#[test]
fn test_topup_credits_and_logs() {
    let dir = TempDir::new().unwrap();
    let ctx = open_wallet(dir.path());
    ctx.registry_service.register("alice", "pw1").unwrap();
    ctx.registry_service.register("bob", "pw2").unwrap();

    ctx.movement_service
        .top_up("alice", dollars(100), "Bank Transfer", None)
        .unwrap();

    let snapshot = ctx.store.load();
    assert_eq!(snapshot.balance("alice"), Some(Decimal::new(10000, 2)));
    let entries = snapshot.entries("alice");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, TransactionKind::Topup);
    assert_eq!(entries[0].counterparty, "Bank Transfer");
}

#[test]
fn test_transfer_moves_money_and_logs_both_sides() {
    let dir = TempDir::new().unwrap();
    let ctx = seeded_wallet(dir.path());

    let snapshot = ctx.store.load();
    assert_eq!(snapshot.balance("alice"), Some(dollars(60)));
    assert_eq!(snapshot.balance("bob"), Some(dollars(40)));

    let sent: Vec<_> = snapshot
        .entries("alice")
        .iter()
        .filter(|e| e.kind == TransactionKind::Sent)
        .collect();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].counterparty, "bob");
    assert_eq!(sent[0].amount, dollars(40));

    let received = snapshot.entries("bob");
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].kind, TransactionKind::Received);
    assert_eq!(received[0].counterparty, "alice");
    assert_eq!(received[0].receipt, sent[0].receipt);
    assert_eq!(received[0].timestamp, sent[0].timestamp);
}

#[test]
fn test_overdraft_is_rejected_without_writing() {
    let dir = TempDir::new().unwrap();
    let ctx = seeded_wallet(dir.path());
    let before = read_ledger_bytes(dir.path());

    let result = ctx.movement_service.transfer("alice", "bob", dollars(1000));
    assert_eq!(result, Err(MoneyError::InsufficientFunds));

    assert_eq!(read_ledger_bytes(dir.path()), before);
    let snapshot = ctx.store.load();
    assert_eq!(snapshot.balance("alice"), Some(dollars(60)));
    assert_eq!(snapshot.balance("bob"), Some(dollars(40)));
}

#[test]
fn test_self_transfer_is_rejected() {
    let dir = TempDir::new().unwrap();
    let ctx = seeded_wallet(dir.path());
    let before = read_ledger_bytes(dir.path());

    assert_eq!(
        ctx.movement_service.transfer("alice", "alice", dollars(10)),
        Err(MoneyError::SelfTransfer)
    );
    assert_eq!(read_ledger_bytes(dir.path()), before);
}

#[test]
fn test_bill_payment_debits_and_records_reference() {
    let dir = TempDir::new().unwrap();
    let ctx = seeded_wallet(dir.path());

    ctx.movement_service
        .pay_bill("bob", "WASA", "ACC123", dollars(15))
        .unwrap();

    let snapshot = ctx.store.load();
    assert_eq!(snapshot.balance("bob"), Some(dollars(25)));
    let bills = ctx.history_service.bill_payments("bob");
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].counterparty, "WASA");
    assert_eq!(bills[0].extra.reference.as_deref(), Some("ACC123"));
}

#[test]
fn test_authentication_failures() {
    let dir = TempDir::new().unwrap();
    let ctx = seeded_wallet(dir.path());

    assert_eq!(
        ctx.registry_service.authenticate("carol", "x"),
        Err(AuthError::NotFound)
    );
    assert_eq!(
        ctx.registry_service.authenticate("alice", "wrong"),
        Err(AuthError::InvalidCredentials)
    );
}

#[test]
fn test_cashout_and_rejections_in_order() {
    let dir = TempDir::new().unwrap();
    let ctx = seeded_wallet(dir.path());
    let before = read_ledger_bytes(dir.path());

    assert_eq!(
        ctx.movement_service.cash_out("bob", "JMMB", "  ", dollars(10)),
        Err(MoneyError::MissingReference(ReferenceField::BankAccount))
    );
    assert_eq!(
        ctx.movement_service.cash_out("bob", "JMMB", "", dollars(0)),
        Err(MoneyError::InvalidAmount)
    );
    assert_eq!(
        ctx.movement_service.transfer("alice", "carol", dollars(1)),
        Err(MoneyError::ReceiverNotFound)
    );
    assert_eq!(read_ledger_bytes(dir.path()), before);

    let receipt = ctx
        .movement_service
        .cash_out("bob", "JMMB", "000123", dollars(40))
        .unwrap();
    assert_eq!(receipt.balance_after, Decimal::ZERO);
    assert_eq!(ctx.history_service.cashouts("bob")[0].extra.bank_account.as_deref(), Some("000123"));
}

#[test]
fn test_duplicate_registration_leaves_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let ctx = seeded_wallet(dir.path());
    let before = read_ledger_bytes(dir.path());

    assert_eq!(
        ctx.registry_service.register("alice", "other"),
        Err(AccountError::AlreadyExists)
    );
    assert_eq!(read_ledger_bytes(dir.path()), before);
    assert!(ctx.registry_service.authenticate("alice", "pw1").is_ok());
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_money_is_conserved_across_transfers() {
    let dir = TempDir::new().unwrap();
    let ctx = seeded_wallet(dir.path());
    ctx.registry_service.register("carol", "pw3").unwrap();

    let total_before = ctx.store.load().total_balance();
    let moves = [
        ("alice", "carol", 25),
        ("bob", "alice", 10),
        ("carol", "bob", 30),
        ("bob", "carol", 500),
        ("carol", "alice", 5),
    ];
    for (from, to, amount) in moves {
        let _ = ctx.movement_service.transfer(from, to, dollars(amount));
    }

    let snapshot = ctx.store.load();
    assert_eq!(snapshot.total_balance(), total_before);
    assert!(snapshot.users.values().all(|a| a.balance >= Decimal::ZERO));

    // Each account's balance is the sum of its signed log
    for (id, account) in &snapshot.users {
        let from_log: Decimal = snapshot.entries(id).iter().map(|e| e.signed_amount()).sum();
        assert_eq!(from_log, account.balance, "log mismatch for {}", id);
    }
}

#[test]
fn test_save_of_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let ctx = seeded_wallet(dir.path());

    let first = ctx.store.load();
    ctx.store.save(&first).unwrap();
    assert_eq!(ctx.store.load(), first);
}

// ============================================================================
// Legacy documents and recovery
// ============================================================================

#[test]
fn test_legacy_document_loads_and_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(LEDGER_FILE);
    let legacy = json!({
        "users": {
            "alice": { "password": "pw1", "balance": 60.5 },
            "bob": { "password": "pw2", "balance": 40 }
        },
        "transactions": {
            "alice": [
                { "type": "topup", "amount": 100.5, "details": "Bank Transfer", "timestamp": "2024-05-01 09:00:00" },
                { "type": "sent", "amount": 40, "to": "bob", "timestamp": "2024-05-01 10:00:00" }
            ],
            "bob": [
                { "type": "received", "amount": 40, "from": "alice", "timestamp": "2024-05-01 10:00:00" }
            ]
        },
        "bill_payments": { "bob": [] },
        "cashouts": {},
        "topups": { "alice": [ { "amount": 100.5 } ] }
    });
    std::fs::write(&path, serde_json::to_string_pretty(&legacy).unwrap()).unwrap();

    let store = JsonFileStore::new(&path);
    let report = store.load_report();
    assert_eq!(report.outcome, LoadOutcome::Loaded);

    let snapshot = report.snapshot;
    assert_eq!(snapshot.balance("alice"), Some(Decimal::new(605, 1)));
    assert_eq!(snapshot.entries("alice")[1].counterparty, "bob");
    assert_eq!(snapshot.entries("bob")[0].counterparty, "alice");
    assert_eq!(snapshot.entries("alice")[0].counterparty, "Bank Transfer");
    assert!(snapshot.entries("alice")[0].receipt.is_none());

    store.save(&snapshot).unwrap();
    assert_eq!(store.load(), snapshot);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["topups"], legacy["topups"]);
    assert_eq!(saved["users"]["alice"]["balance"], "60.5");
}

#[test]
fn test_legacy_plaintext_login_upgrades_credential() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(LEDGER_FILE);
    std::fs::write(
        &path,
        r#"{"users": {"alice": {"password": "pw1", "balance": 10}}, "transactions": {"alice": []}}"#,
    )
    .unwrap();

    let ctx = open_wallet(dir.path());
    let mut session = ctx.session();
    session.login("alice", "pw1").unwrap();

    let stored = ctx.store.load().account("alice").unwrap().password.clone();
    assert!(stored.starts_with("argon2id$"));
    assert!(!std::fs::read_to_string(&path).unwrap().contains("\"pw1\""));

    session.logout();
    assert!(session.login("alice", "pw1").is_ok());
}

#[test]
fn test_corrupt_document_recovers_to_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(LEDGER_FILE);
    std::fs::write(&path, "{\"users\": {\"alice\": ").unwrap();

    let ctx = open_wallet(dir.path());
    assert!(ctx.startup.is_recovered());
    assert!(ctx.store.load().users.is_empty());

    let store = JsonFileStore::new(&path);
    let preserved = std::fs::read_to_string(store.corrupt_copy_path()).unwrap();
    assert_eq!(preserved, "{\"users\": {\"alice\": ");

    // The wallet stays usable, and the first write replaces the bad file
    ctx.registry_service.register("alice", "pw1").unwrap();
    assert_eq!(store.load_report().outcome, LoadOutcome::Loaded);
    assert_eq!(store.load().users.len(), 1);
}

#[test]
fn test_unknown_entry_type_does_not_wipe_other_logs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(LEDGER_FILE);
    let document = json!({
        "users": {
            "alice": { "password": "pw1", "balance": "60" },
            "bob": { "password": "pw2", "balance": "45" }
        },
        "transactions": {
            "alice": [
                { "type": "topup", "amount": "100", "details": "Bank Transfer", "timestamp": "2024-05-01 09:00:00" },
                { "type": "sent", "amount": "40", "to": "bob", "timestamp": "2024-05-01 10:00:00" }
            ],
            "bob": [
                { "type": "received", "amount": "40", "from": "alice", "timestamp": "2024-05-01 10:00:00" },
                { "type": "refund", "amount": "5", "timestamp": "2024-05-02 10:00:00" }
            ]
        }
    });
    std::fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();

    let ctx = open_wallet(dir.path());
    assert!(ctx.startup.is_recovered());

    ctx.movement_service
        .top_up("alice", dollars(1), "Cash at Agent", None)
        .unwrap();

    let snapshot = ctx.store.load();
    assert_eq!(snapshot.entries("alice").len(), 3);
    assert_eq!(snapshot.entries("bob").len(), 1);
    assert_eq!(snapshot.balance("bob"), Some(dollars(45)));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["unreadable"]["transactions"]["bob"][0]["type"], "refund");

    let result = ctx.doctor_service.run_checks();
    assert_eq!(
        result.checks["unreadable_records"].status,
        instacash_core::services::CheckStatus::Warning
    );
}

#[test]
fn test_first_open_creates_empty_ledger() {
    let dir = TempDir::new().unwrap();
    let ctx = open_wallet(dir.path());

    assert_eq!(ctx.startup, LoadOutcome::Fresh);
    assert!(dir.path().join(LEDGER_FILE).exists());
    assert_eq!(ctx.store.load(), LedgerSnapshot::new());

    let status = ctx.status_service.store_status();
    assert_eq!(status.total_accounts, 0);
    assert_eq!(status.currency, "TTD");
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn test_session_flow_over_file_store() {
    let dir = TempDir::new().unwrap();
    let ctx = seeded_wallet(dir.path());
    let mut session = ctx.session();

    assert_eq!(session.state(), &SessionState::Anonymous);
    assert_eq!(
        session.pay_bill("WASA", "ACC1", dollars(5)),
        Err(MoneyError::NotAuthenticated)
    );

    session.login("bob", "pw2").unwrap();
    assert_eq!(session.screen(), Screen::Wallet);
    session.pay_bill("TSTT", "ACC9", dollars(5)).unwrap();

    let history = session.history(&HistoryFilter::all()).unwrap();
    assert_eq!(history[0].kind, TransactionKind::BillPayment);
    assert_eq!(history[1].kind, TransactionKind::Received);

    let overview = session.overview().unwrap();
    assert_eq!(overview.balance, dollars(35));
    assert_eq!(overview.totals.received, dollars(40));
    assert_eq!(overview.totals.bills_paid, dollars(5));

    // A second session is independent of the first
    let other = ctx.session();
    assert!(!other.is_authenticated());

    session.logout();
    assert_eq!(session.overview().unwrap_err(), MoneyError::NotAuthenticated);
}

#[test]
fn test_doctor_reports_healthy_ledger() {
    let dir = TempDir::new().unwrap();
    let ctx = seeded_wallet(dir.path());
    ctx.movement_service
        .pay_bill("bob", "FLOW", "X-1", dollars(1))
        .unwrap();

    let result = ctx.doctor_service.run_checks();
    assert!(result.is_healthy());
    assert_eq!(result.summary.warnings, 0);
}
