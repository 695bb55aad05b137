//! Movement service - every balance-affecting operation
//!
//! Each operation validates against a freshly loaded snapshot, and only once
//! every check has passed does it touch balances and append log entries.
//! A rejected operation therefore never writes anything.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::result::{MoneyError, ReferenceField};
use crate::domain::{Stamp, TransactionEntry, TransactionKind};

use super::ledger::{Ledger, Mutation};

/// Summary of one committed operation, from the acting account's side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub receipt: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub counterparty: String,
    pub timestamp: String,
    pub balance_after: Decimal,
}

impl Receipt {
    fn from_entry(entry: &TransactionEntry, stamp: &Stamp, balance_after: Decimal) -> Self {
        Self {
            receipt: stamp.receipt,
            kind: entry.kind,
            amount: entry.amount,
            counterparty: entry.counterparty.clone(),
            timestamp: stamp.timestamp.clone(),
            balance_after,
        }
    }
}

/// Movement service for transfers, top-ups, bill payments and cashouts
pub struct MovementService {
    ledger: Arc<Ledger>,
}

fn ensure_positive(amount: Decimal) -> Result<(), MoneyError> {
    if amount <= Decimal::ZERO {
        return Err(MoneyError::InvalidAmount);
    }
    Ok(())
}

fn ensure_reference(reference: &str, field: ReferenceField) -> Result<(), MoneyError> {
    if reference.trim().is_empty() {
        return Err(MoneyError::MissingReference(field));
    }
    Ok(())
}

/// `balance + amount`, rejected rather than overflowing
fn credited(balance: Decimal, amount: Decimal) -> Result<Decimal, MoneyError> {
    balance.checked_add(amount).ok_or(MoneyError::AmountTooLarge)
}

impl MovementService {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Move `amount` from one wallet to another
    ///
    /// Writes a `sent` entry on the sender and a `received` entry on the
    /// receiver, both carrying the same timestamp and receipt.
    pub fn transfer(&self, from: &str, to: &str, amount: Decimal) -> Result<Receipt, MoneyError> {
        self.ledger.transact(|snapshot| {
            if from == to {
                return Err(MoneyError::SelfTransfer);
            }
            let available = snapshot.balance(from).ok_or(MoneyError::AccountNotFound)?;
            let receiver_balance = snapshot.balance(to).ok_or(MoneyError::ReceiverNotFound)?;
            ensure_positive(amount)?;
            if amount > available {
                return Err(MoneyError::InsufficientFunds);
            }
            let receiver_after = credited(receiver_balance, amount)?;

            let stamp = Stamp::now();
            let balance_after = available - amount;
            if let Some(sender) = snapshot.account_mut(from) {
                sender.balance = balance_after;
            }
            if let Some(receiver) = snapshot.account_mut(to) {
                receiver.balance = receiver_after;
            }

            let sent = TransactionEntry::sent(to, amount, &stamp);
            let receipt = Receipt::from_entry(&sent, &stamp, balance_after);
            snapshot.append(from, sent);
            snapshot.append(to, TransactionEntry::received(from, amount, &stamp));

            Ok(Mutation::Commit(receipt))
        })
    }

    /// Credit the wallet from an outside funding method
    pub fn top_up(
        &self,
        id: &str,
        amount: Decimal,
        method: &str,
        reference: Option<&str>,
    ) -> Result<Receipt, MoneyError> {
        self.ledger.transact(|snapshot| {
            let available = snapshot.balance(id).ok_or(MoneyError::AccountNotFound)?;
            ensure_positive(amount)?;
            let balance_after = credited(available, amount)?;

            let stamp = Stamp::now();
            if let Some(account) = snapshot.account_mut(id) {
                account.balance = balance_after;
            }

            let entry = TransactionEntry::topup(method, amount, reference, &stamp);
            let receipt = Receipt::from_entry(&entry, &stamp, balance_after);
            snapshot.append(id, entry);

            Ok(Mutation::Commit(receipt))
        })
    }

    /// Pay a biller against the customer's account/contract number
    pub fn pay_bill(
        &self,
        id: &str,
        biller: &str,
        account_ref: &str,
        amount: Decimal,
    ) -> Result<Receipt, MoneyError> {
        self.debit(id, amount, account_ref, ReferenceField::BillAccount, |stamp| {
            TransactionEntry::bill_payment(biller, account_ref.trim(), amount, stamp)
        })
    }

    /// Withdraw to a bank account
    pub fn cash_out(
        &self,
        id: &str,
        bank: &str,
        bank_account: &str,
        amount: Decimal,
    ) -> Result<Receipt, MoneyError> {
        self.debit(id, amount, bank_account, ReferenceField::BankAccount, |stamp| {
            TransactionEntry::cashout(bank, bank_account.trim(), amount, stamp)
        })
    }

    /// Shared shape of bill payments and cashouts: amount, then reference,
    /// then funds, then a single debit entry
    fn debit<F>(
        &self,
        id: &str,
        amount: Decimal,
        reference: &str,
        field: ReferenceField,
        entry: F,
    ) -> Result<Receipt, MoneyError>
    where
        F: FnOnce(&Stamp) -> TransactionEntry,
    {
        self.ledger.transact(|snapshot| {
            let available = snapshot.balance(id).ok_or(MoneyError::AccountNotFound)?;
            ensure_positive(amount)?;
            ensure_reference(reference, field)?;
            if amount > available {
                return Err(MoneyError::InsufficientFunds);
            }

            let stamp = Stamp::now();
            let balance_after = available - amount;
            if let Some(account) = snapshot.account_mut(id) {
                account.balance = balance_after;
            }

            let entry = entry(&stamp);
            let receipt = Receipt::from_entry(&entry, &stamp, balance_after);
            snapshot.append(id, entry);

            Ok(Mutation::Commit(receipt))
        })
    }
}
