//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
pub mod credential;
pub mod money;
pub mod result;
mod snapshot;
mod transaction;

pub use account::{Account, AccountId};
pub use credential::{Argon2Params, StoredCredential};
pub use money::{format_money, parse_amount, DEFAULT_CURRENCY};
pub use snapshot::LedgerSnapshot;
pub use transaction::{EntryExtra, Stamp, TransactionEntry, TransactionKind, TIMESTAMP_FORMAT};
