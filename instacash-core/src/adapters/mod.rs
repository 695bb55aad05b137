//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - A single JSON document on disk for the LedgerStore port
//! - An in-process store for embedding and tests

pub mod json_file;
pub mod memory;
