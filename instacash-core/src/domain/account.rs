//! Account domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Login email; the primary key of every account (case-sensitive)
pub type AccountId = String;

/// A registered wallet
///
/// The id is not stored on the record itself; it is the key the record is
/// filed under in `LedgerSnapshot::users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stored credential. Either an encoded Argon2id hash or, for documents
    /// written by older wallets, the plaintext password.
    pub password: String,
    pub balance: Decimal,
}

impl Account {
    pub fn new(password: impl Into<String>, balance: Decimal) -> Self {
        Self {
            password: password.into(),
            balance,
        }
    }
}
