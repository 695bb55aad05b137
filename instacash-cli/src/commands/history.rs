//! History command - list the wallet's transactions, newest first

use anyhow::{anyhow, Result};
use colored::Colorize;

use instacash_core::{format_money, EntryPoint, HistoryFilter, TransactionEntry, TransactionKind};

use super::{authenticated_session, finish, get_context, get_logger, AuthArgs};
use crate::output;

/// Render a list of entries as a table
pub fn print_entries(entries: &[TransactionEntry]) {
    if entries.is_empty() {
        println!("No transactions yet.");
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Type", "Amount", "Details"]);
    for entry in entries {
        let amount = format_money(entry.amount);
        let amount = if entry.kind.is_debit() {
            format!("-{}", amount).red().to_string()
        } else {
            format!("+{}", amount).green().to_string()
        };

        let mut details = entry.describe();
        if let Some(reference) = entry.extra.reference.as_deref().or(entry.extra.bank_account.as_deref()) {
            details = format!("{} (ref {})", details, reference);
        }

        table.add_row(vec![entry.timestamp.clone(), entry.kind.to_string(), amount, details]);
    }
    println!("{}", table);
}

pub fn run(auth: AuthArgs, kind: Option<String>, limit: Option<usize>, json: bool) -> Result<()> {
    let kind = kind
        .map(|k| k.parse::<TransactionKind>().map_err(|e| anyhow!(e)))
        .transpose()?;

    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context(&logger)?;
    let session = authenticated_session(&ctx, &auth, &logger)?;

    let filter = HistoryFilter { kind, limit };
    finish(&logger, "history", session.history(&filter), json, |entries| {
        print_entries(entries)
    })
}
