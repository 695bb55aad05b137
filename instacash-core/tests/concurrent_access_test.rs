//! Concurrent ledger access tests
//!
//! Each thread opens its own store over the same JSON file, the way separate
//! `icash` processes would. Only the file lock orders them.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rust_decimal::Decimal;
use tempfile::TempDir;

use instacash_core::adapters::json_file::JsonFileStore;
use instacash_core::domain::Account;
use instacash_core::ports::LedgerStore;
use instacash_core::services::{Ledger, MovementService};
use instacash_core::{LedgerSnapshot, MoneyError, TransactionKind};

/// Number of concurrent threads
const THREAD_COUNT: usize = 6;

/// Transfers attempted per thread
const ITERATIONS_PER_THREAD: usize = 15;

fn account_id(n: usize) -> String {
    format!("user{}", n)
}

/// Ledger with THREAD_COUNT accounts holding 50.00 each
fn seed_ledger(path: &Path) {
    let mut snapshot = LedgerSnapshot::new();
    for n in 0..THREAD_COUNT {
        snapshot.open_account(account_id(n), Account::new("pw", Decimal::new(50, 0)));
    }
    JsonFileStore::new(path).save(&snapshot).unwrap();
}

fn movement_over(path: &PathBuf) -> MovementService {
    let store = Arc::new(JsonFileStore::new(path));
    MovementService::new(Arc::new(Ledger::new(store)))
}

/// Every thread sends from its own account to its neighbour in amounts
/// that will eventually overdraw. Money must be conserved, no balance may
/// go negative, and each successful transfer must appear on both sides.
#[test]
fn test_concurrent_transfers_from_separate_stores() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("wallet.json");
    seed_ledger(&path);

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let path = Arc::new(path);
    let success_count = Arc::new(AtomicUsize::new(0));
    let rejected_count = Arc::new(AtomicUsize::new(0));

    let mut handles = vec![];

    for thread_id in 0..THREAD_COUNT {
        let barrier = Arc::clone(&barrier);
        let path = Arc::clone(&path);
        let success_count = Arc::clone(&success_count);
        let rejected_count = Arc::clone(&rejected_count);

        handles.push(thread::spawn(move || {
            let movement = movement_over(&path);
            let from = account_id(thread_id);
            let to = account_id((thread_id + 1) % THREAD_COUNT);

            barrier.wait();

            for i in 0..ITERATIONS_PER_THREAD {
                // 7.25, 8.25, 9.25, ...
                let amount = Decimal::new(725 + 100 * i as i64, 2);
                match movement.transfer(&from, &to, amount) {
                    Ok(_) => {
                        success_count.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(MoneyError::InsufficientFunds) => {
                        rejected_count.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => panic!("unexpected error in thread {}: {}", thread_id, e),
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let snapshot = JsonFileStore::new(path.as_path()).load();
    let successes = success_count.load(Ordering::SeqCst);

    assert_eq!(
        successes + rejected_count.load(Ordering::SeqCst),
        THREAD_COUNT * ITERATIONS_PER_THREAD
    );
    assert_eq!(snapshot.total_balance(), Decimal::new(50 * THREAD_COUNT as i64, 0));
    assert!(snapshot.users.values().all(|a| a.balance >= Decimal::ZERO));

    let count_kind = |kind: TransactionKind| {
        snapshot
            .transactions
            .values()
            .flatten()
            .filter(|e| e.kind == kind)
            .count()
    };
    assert_eq!(count_kind(TransactionKind::Sent), successes);
    assert_eq!(count_kind(TransactionKind::Received), successes);

    for n in 0..THREAD_COUNT {
        let id = account_id(n);
        let from_log: Decimal = snapshot.entries(&id).iter().map(|e| e.signed_amount()).sum();
        assert_eq!(
            Decimal::new(50, 0) + from_log,
            snapshot.balance(&id).unwrap(),
            "balance of {} disagrees with its log",
            id
        );
    }
}

/// Threads sharing one `Ledger` are ordered by its in-process gate
#[test]
fn test_concurrent_topups_through_shared_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("wallet.json");
    seed_ledger(&path);

    let movement = Arc::new(movement_over(&path));
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let movement = Arc::clone(&movement);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ITERATIONS_PER_THREAD {
                    movement
                        .top_up(&account_id(0), Decimal::new(1, 1), "Cash at Agent", None)
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let snapshot = JsonFileStore::new(&path).load();
    let expected_topups = THREAD_COUNT * ITERATIONS_PER_THREAD;
    assert_eq!(snapshot.entries(&account_id(0)).len(), expected_topups);
    assert_eq!(
        snapshot.balance(&account_id(0)),
        Some(Decimal::new(50, 0) + Decimal::new(expected_topups as i64, 1))
    );
}
