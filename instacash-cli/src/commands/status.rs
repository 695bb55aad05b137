//! Status command - whole-wallet summary

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use instacash_core::ports::LoadOutcome;
use instacash_core::EntryPoint;

use super::{get_context, get_data_dir, get_logger};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context(&logger)?;
    let status = ctx.status_service.store_status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Wallet Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["Accounts".to_string(), status.total_accounts.to_string()]);
    table.add_row(vec!["Transactions".to_string(), status.total_entries.to_string()]);
    table.add_row(vec![
        "Money held".to_string(),
        output::money(status.total_balance, &status.currency),
    ]);
    table.add_row(vec![
        "Data directory".to_string(),
        get_data_dir().display().to_string(),
    ]);
    println!("{}", table);

    if let LoadOutcome::Recovered { reason } = &status.load {
        println!();
        output::warning(&format!("Ledger was recovered on load: {}", reason));
    } else if status.total_accounts == 0 {
        println!();
        output::info("No accounts yet. Create one with `icash register`.");
    }

    Ok(())
}
