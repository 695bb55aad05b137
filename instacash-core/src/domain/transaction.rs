//! Transaction log entry model

use std::fmt;
use std::str::FromStr;

use chrono::Local;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::format_money;

/// Wall-clock format of `TransactionEntry::timestamp` (second granularity)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What kind of balance movement an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sent,
    Received,
    Topup,
    BillPayment,
    Cashout,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 5] = [
        TransactionKind::Sent,
        TransactionKind::Received,
        TransactionKind::Topup,
        TransactionKind::BillPayment,
        TransactionKind::Cashout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Sent => "sent",
            TransactionKind::Received => "received",
            TransactionKind::Topup => "topup",
            TransactionKind::BillPayment => "bill_payment",
            TransactionKind::Cashout => "cashout",
        }
    }

    /// True for kinds that take money out of the owning account
    pub fn is_debit(&self) -> bool {
        matches!(
            self,
            TransactionKind::Sent | TransactionKind::BillPayment | TransactionKind::Cashout
        )
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        TransactionKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown transaction kind '{}'. Expected one of: sent, received, topup, bill_payment, cashout",
                    s
                )
            })
    }
}

/// Kind-specific fields, flattened into the entry when serialized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryExtra {
    /// Biller account number for bill payments; free-text reference for top-ups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Destination bank account for cashouts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
}

/// Timestamp and receipt shared by every entry one operation writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub timestamp: String,
    pub receipt: Uuid,
}

impl Stamp {
    pub fn now() -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            receipt: Uuid::new_v4(),
        }
    }
}

/// One immutable record in an account's transaction log
///
/// `counterparty` depends on `kind`: the other account for transfers, the
/// biller, the bank, or the funding method for top-ups. Older documents
/// stored it as `to`, `from` or `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(default, alias = "to", alias = "from", alias = "details")]
    pub counterparty: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: EntryExtra,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Uuid>,
}

impl TransactionEntry {
    fn new(
        kind: TransactionKind,
        amount: Decimal,
        counterparty: impl Into<String>,
        stamp: &Stamp,
    ) -> Self {
        Self {
            kind,
            amount,
            counterparty: counterparty.into(),
            timestamp: stamp.timestamp.clone(),
            extra: EntryExtra::default(),
            receipt: Some(stamp.receipt),
        }
    }

    /// Sender side of a transfer
    pub fn sent(to: &str, amount: Decimal, stamp: &Stamp) -> Self {
        Self::new(TransactionKind::Sent, amount, to, stamp)
    }

    /// Receiver side of a transfer
    pub fn received(from: &str, amount: Decimal, stamp: &Stamp) -> Self {
        Self::new(TransactionKind::Received, amount, from, stamp)
    }

    pub fn topup(method: &str, amount: Decimal, reference: Option<&str>, stamp: &Stamp) -> Self {
        let mut entry = Self::new(TransactionKind::Topup, amount, method, stamp);
        entry.extra.reference = reference
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        entry
    }

    pub fn bill_payment(biller: &str, account_ref: &str, amount: Decimal, stamp: &Stamp) -> Self {
        let mut entry = Self::new(TransactionKind::BillPayment, amount, biller, stamp);
        entry.extra.reference = Some(account_ref.to_string());
        entry
    }

    pub fn cashout(bank: &str, bank_account: &str, amount: Decimal, stamp: &Stamp) -> Self {
        let mut entry = Self::new(TransactionKind::Cashout, amount, bank, stamp);
        entry.extra.bank_account = Some(bank_account.to_string());
        entry
    }

    /// Signed effect on the owning account's balance
    pub fn signed_amount(&self) -> Decimal {
        if self.kind.is_debit() {
            -self.amount
        } else {
            self.amount
        }
    }

    /// One-line description as shown in the wallet history
    pub fn describe(&self) -> String {
        let amount = format_money(self.amount);
        match self.kind {
            TransactionKind::Sent => format!("Sent {} to {}", amount, self.counterparty),
            TransactionKind::Received => format!("Received {} from {}", amount, self.counterparty),
            TransactionKind::BillPayment => {
                format!("Bill payment of {} to {}", amount, self.counterparty)
            }
            TransactionKind::Topup => format!("Top-up of {} via {}", amount, self.counterparty),
            TransactionKind::Cashout => format!("Cashout of {} to {}", amount, self.counterparty),
        }
    }
}
