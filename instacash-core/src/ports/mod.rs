//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod ledger_store;

pub use ledger_store::{LedgerStore, LoadOutcome, LoadReport, StoreLock};
