//! History service - read-only views over the transaction log
//!
//! The per-account log is the only record of what happened. Bill payment,
//! cashout and top-up lists are filters over it, computed on demand.

use std::sync::Arc;

use crate::domain::{TransactionEntry, TransactionKind};

use super::ledger::Ledger;

/// Which entries to return
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub kind: Option<TransactionKind>,
    pub limit: Option<usize>,
}

impl HistoryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn kind(kind: TransactionKind) -> Self {
        Self {
            kind: Some(kind),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, entry: &TransactionEntry) -> bool {
        self.kind.map_or(true, |k| entry.kind == k)
    }
}

/// History service for transaction listings
pub struct HistoryService {
    ledger: Arc<Ledger>,
}

impl HistoryService {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Entries for an account, newest first
    ///
    /// Unknown accounts have no history rather than an error.
    pub fn history(&self, id: &str, filter: &HistoryFilter) -> Vec<TransactionEntry> {
        let snapshot = self.ledger.snapshot();
        let matching = snapshot
            .entries(id)
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned();

        match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }

    pub fn bill_payments(&self, id: &str) -> Vec<TransactionEntry> {
        self.history(id, &HistoryFilter::kind(TransactionKind::BillPayment))
    }

    pub fn cashouts(&self, id: &str) -> Vec<TransactionEntry> {
        self.history(id, &HistoryFilter::kind(TransactionKind::Cashout))
    }

    pub fn topups(&self, id: &str) -> Vec<TransactionEntry> {
        self.history(id, &HistoryFilter::kind(TransactionKind::Topup))
    }
}
