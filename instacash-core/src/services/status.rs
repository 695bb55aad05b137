//! Status service - wallet and store summaries

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::TransactionKind;
use crate::ports::LoadOutcome;

use super::ledger::Ledger;

/// Status service for wallet summaries
pub struct StatusService {
    ledger: Arc<Ledger>,
    currency: String,
}

impl StatusService {
    pub fn new(ledger: Arc<Ledger>, currency: impl Into<String>) -> Self {
        Self {
            ledger,
            currency: currency.into(),
        }
    }

    /// Balance and per-kind totals for one wallet
    pub fn overview(&self, id: &str) -> Option<WalletOverview> {
        let snapshot = self.ledger.snapshot();
        let account = snapshot.account(id)?;
        let entries = snapshot.entries(id);

        let mut totals = KindTotals::default();
        for entry in entries {
            let slot = match entry.kind {
                TransactionKind::Sent => &mut totals.sent,
                TransactionKind::Received => &mut totals.received,
                TransactionKind::Topup => &mut totals.topped_up,
                TransactionKind::BillPayment => &mut totals.bills_paid,
                TransactionKind::Cashout => &mut totals.cashed_out,
            };
            *slot = slot.saturating_add(entry.amount);
        }

        Some(WalletOverview {
            account_id: id.to_string(),
            balance: account.balance,
            currency: self.currency.clone(),
            entry_count: entries.len(),
            totals,
        })
    }

    /// Whole-store summary
    pub fn store_status(&self) -> StoreStatus {
        let report = self.ledger.load_report();
        let snapshot = report.snapshot;

        StoreStatus {
            total_accounts: snapshot.users.len(),
            total_entries: snapshot.entry_count(),
            total_balance: snapshot.total_balance(),
            currency: self.currency.clone(),
            load: report.outcome,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindTotals {
    pub sent: Decimal,
    pub received: Decimal,
    pub topped_up: Decimal,
    pub bills_paid: Decimal,
    pub cashed_out: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletOverview {
    pub account_id: String,
    pub balance: Decimal,
    pub currency: String,
    pub entry_count: usize,
    pub totals: KindTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub total_accounts: usize,
    pub total_entries: usize,
    pub total_balance: Decimal,
    pub currency: String,
    pub load: LoadOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::{Account, LedgerSnapshot, Stamp, TransactionEntry};

    #[test]
    fn test_overview_totals() {
        let mut snapshot = LedgerSnapshot::new();
        snapshot.open_account("alice", Account::new("pw", Decimal::new(55, 0)));
        snapshot.open_account("bob", Account::new("pw", Decimal::new(40, 0)));
        let stamp = Stamp::now();
        snapshot.append("alice", TransactionEntry::topup("Bank Transfer", Decimal::new(100, 0), None, &stamp));
        snapshot.append("alice", TransactionEntry::sent("bob", Decimal::new(40, 0), &stamp));
        snapshot.append("alice", TransactionEntry::cashout("JMMB", "1", Decimal::new(5, 0), &stamp));

        let store = Arc::new(MemoryStore::with_snapshot(&snapshot).unwrap());
        let service = StatusService::new(Arc::new(Ledger::new(store)), "TTD");

        let overview = service.overview("alice").unwrap();
        assert_eq!(overview.balance, Decimal::new(55, 0));
        assert_eq!(overview.entry_count, 3);
        assert_eq!(overview.totals.topped_up, Decimal::new(100, 0));
        assert_eq!(overview.totals.sent, Decimal::new(40, 0));
        assert_eq!(overview.totals.cashed_out, Decimal::new(5, 0));
        assert_eq!(overview.totals.received, Decimal::ZERO);
        assert!(service.overview("carol").is_none());

        let status = service.store_status();
        assert_eq!(status.total_accounts, 2);
        assert_eq!(status.total_entries, 3);
        assert_eq!(status.total_balance, Decimal::new(95, 0));
        assert_eq!(status.load, LoadOutcome::Loaded);
    }
}
