//! Ledger snapshot - every account and every log, as one unit

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::account::{Account, AccountId};
use super::transaction::TransactionEntry;

/// Top-level document sections the ledger owns
pub const USERS_SECTION: &str = "users";
pub const TRANSACTIONS_SECTION: &str = "transactions";

/// Where records that failed to parse are kept, keyed like the sections
/// they came from
pub const UNREADABLE_SECTION: &str = "unreadable";

/// The complete in-memory ledger
///
/// Sections other than `users` and `transactions` (older wallets kept
/// duplicate `bill_payments`, `cashouts` and `topups` lists) are carried in
/// `other` so a load/save cycle never drops them. They are not authoritative.
/// The one section the crate itself adds there is `unreadable`, filled by
/// `from_document`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    pub users: BTreeMap<AccountId, Account>,
    pub transactions: BTreeMap<AccountId, Vec<TransactionEntry>>,
    #[serde(flatten)]
    pub other: BTreeMap<String, JsonValue>,
}

impl LedgerSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a parsed document, record by record
    ///
    /// A missing section becomes an empty container silently. A section that
    /// is not a JSON object also becomes empty, and its value is kept under
    /// `unreadable` as `<section>_section`. Inside a readable section
    /// each account record and each log entry is parsed on its own: one that
    /// fails is moved verbatim into the `unreadable` section, so the rest of
    /// the ledger survives and a later save keeps the original bytes of the
    /// bad record. Every problem is reported in the returned list so the
    /// caller can flag the load as a recovery rather than a normal read.
    pub fn from_document(document: JsonValue) -> (Self, Vec<String>) {
        let mut problems = Vec::new();

        let mut sections = match document {
            JsonValue::Object(map) => map,
            JsonValue::Null => Map::new(),
            _ => {
                problems.push("document is not a JSON object".to_string());
                Map::new()
            }
        };

        let mut unreadable = as_map(sections.remove(UNREADABLE_SECTION));
        let mut bad_users = as_map(unreadable.remove(USERS_SECTION));
        let mut bad_entries = as_map(unreadable.remove(TRANSACTIONS_SECTION));

        let users = match sections.remove(USERS_SECTION) {
            None | Some(JsonValue::Null) => BTreeMap::new(),
            Some(JsonValue::Object(records)) => read_users(records, &mut bad_users, &mut problems),
            Some(value) => {
                problems.push(format!("'{}' section is not an object", USERS_SECTION));
                unreadable.insert(format!("{}_section", USERS_SECTION), value);
                BTreeMap::new()
            }
        };

        let transactions = match sections.remove(TRANSACTIONS_SECTION) {
            None | Some(JsonValue::Null) => BTreeMap::new(),
            Some(JsonValue::Object(logs)) => read_logs(logs, &mut bad_entries, &mut problems),
            Some(value) => {
                problems.push(format!("'{}' section is not an object", TRANSACTIONS_SECTION));
                unreadable.insert(format!("{}_section", TRANSACTIONS_SECTION), value);
                BTreeMap::new()
            }
        };

        if !bad_users.is_empty() {
            unreadable.insert(USERS_SECTION.to_string(), JsonValue::Object(bad_users));
        }
        if !bad_entries.is_empty() {
            unreadable.insert(TRANSACTIONS_SECTION.to_string(), JsonValue::Object(bad_entries));
        }
        if !unreadable.is_empty() {
            sections.insert(UNREADABLE_SECTION.to_string(), JsonValue::Object(unreadable));
        }

        let snapshot = Self {
            users,
            transactions,
            other: sections.into_iter().collect(),
        };
        (snapshot, problems)
    }

    /// Records set aside by earlier loads, as `(accounts, log entries)`
    pub fn unreadable_counts(&self) -> (usize, usize) {
        let section = |name: &str| {
            self.other
                .get(UNREADABLE_SECTION)
                .and_then(|u| u.get(name))
                .and_then(JsonValue::as_object)
        };
        let accounts = section(USERS_SECTION).map_or(0, Map::len);
        let entries = section(TRANSACTIONS_SECTION).map_or(0, |logs| {
            logs.values()
                .map(|kept| kept.as_array().map_or(1, Vec::len))
                .sum()
        });
        (accounts, entries)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.users.contains_key(id)
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.users.get(id)
    }

    pub fn account_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.users.get_mut(id)
    }

    pub fn balance(&self, id: &str) -> Option<Decimal> {
        self.users.get(id).map(|a| a.balance)
    }

    /// Log for an account, oldest first (empty if it has none)
    pub fn entries(&self, id: &str) -> &[TransactionEntry] {
        self.transactions.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Insert a new account together with its empty log
    pub fn open_account(&mut self, id: impl Into<AccountId>, account: Account) {
        let id = id.into();
        self.transactions.entry(id.clone()).or_default();
        self.users.insert(id, account);
    }

    /// Append to an account's log, creating the log if needed
    pub fn append(&mut self, id: &str, entry: TransactionEntry) {
        self.transactions.entry(id.to_string()).or_default().push(entry);
    }

    /// Sum of every balance in the ledger, pinned at `Decimal::MAX`
    pub fn total_balance(&self) -> Decimal {
        self.users
            .values()
            .fold(Decimal::ZERO, |total, a| total.saturating_add(a.balance))
    }

    pub fn entry_count(&self) -> usize {
        self.transactions.values().map(Vec::len).sum()
    }
}

/// An object section as a map; anything else is kept under `previous`
fn as_map(value: Option<JsonValue>) -> Map<String, JsonValue> {
    match value {
        Some(JsonValue::Object(map)) => map,
        None | Some(JsonValue::Null) => Map::new(),
        Some(other) => {
            let mut map = Map::new();
            map.insert("previous".to_string(), other);
            map
        }
    }
}

fn read_users(
    records: Map<String, JsonValue>,
    bad_users: &mut Map<String, JsonValue>,
    problems: &mut Vec<String>,
) -> BTreeMap<AccountId, Account> {
    let mut users = BTreeMap::new();
    let mut bad = 0;
    for (id, record) in records {
        match Account::deserialize(&record) {
            Ok(account) => {
                users.insert(id, account);
            }
            Err(_) => {
                bad += 1;
                bad_users.insert(id, record);
            }
        }
    }
    if bad > 0 {
        problems.push(format!("{} account records unreadable", bad));
    }
    users
}

fn read_logs(
    logs: Map<String, JsonValue>,
    bad_entries: &mut Map<String, JsonValue>,
    problems: &mut Vec<String>,
) -> BTreeMap<AccountId, Vec<TransactionEntry>> {
    let mut transactions = BTreeMap::new();
    let mut bad = 0;
    for (id, log) in logs {
        let items = match log {
            JsonValue::Array(items) => items,
            JsonValue::Null => Vec::new(),
            other => vec![other],
        };

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            match TransactionEntry::deserialize(&item) {
                Ok(entry) => entries.push(entry),
                Err(_) => {
                    bad += 1;
                    let kept = bad_entries
                        .entry(id.as_str())
                        .or_insert_with(|| JsonValue::Array(Vec::new()));
                    match kept {
                        JsonValue::Array(kept) => kept.push(item),
                        other => {
                            let previous = other.take();
                            *other = JsonValue::Array(vec![previous, item]);
                        }
                    }
                }
            }
        }
        transactions.insert(id, entries);
    }
    if bad > 0 {
        problems.push(format!("{} log entries unreadable", bad));
    }
    transactions
}
