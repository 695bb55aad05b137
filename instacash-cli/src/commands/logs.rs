//! Logs command - inspect the wallet's event log
//!
//! The log only holds event names, operations and rejection kinds, so
//! everything here is safe to paste into a bug report.

use anyhow::Result;
use chrono::{Duration, Local, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use serde_json::json;

use instacash_core::domain::TIMESTAMP_FORMAT;
use instacash_core::services::LogEntry;
use instacash_core::{EntryPoint, LoggingService};

use super::get_data_dir;
use crate::output;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent wallet events, newest first
    List {
        /// Number of events to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only rejected operations and failures
        #[arg(long)]
        rejected: bool,
        /// Only events with this name, e.g. transfer_rejected
        #[arg(long)]
        event: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop events older than a number of days
    Clear {
        /// Keep this many days of events
        #[arg(long, default_value = "30")]
        keep_days: u32,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count events by name
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn local_time(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

/// Where in the app the event came from: operation, then command, then screen
fn origin(entry: &LogEntry) -> String {
    [&entry.operation, &entry.command, &entry.screen]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" / ")
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List { limit, rejected, event, json } => list(limit, rejected, event, json),
        LogsCommands::Clear { keep_days, force, json } => clear(keep_days, force, json),
        LogsCommands::Stats { json } => stats(json),
    }
}

fn list(limit: usize, rejected: bool, event: Option<String>, json: bool) -> Result<()> {
    let log = open_log()?;
    let mut entries = if rejected {
        log.get_errors(limit)?
    } else {
        log.get_recent(limit)?
    };
    if let Some(name) = &event {
        entries.retain(|e| &e.event == name);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        output::info("No wallet events recorded.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Via", "Event", "Operation", "Rejected as"]);
    for entry in &entries {
        let kind = entry
            .error_message
            .as_deref()
            .map(|k| k.red().to_string())
            .unwrap_or_default();
        table.add_row(vec![
            local_time(entry.timestamp),
            entry.entry_point.clone(),
            entry.event.clone(),
            origin(entry),
            kind,
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn clear(keep_days: u32, force: bool, json: bool) -> Result<()> {
    let log = open_log()?;
    let cutoff = Utc::now() - Duration::days(i64::from(keep_days));

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Drop wallet events from before {}?",
                cutoff.with_timezone(&Local).format("%Y-%m-%d")
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Nothing dropped.");
            return Ok(());
        }
    }

    let deleted = log.delete_before(cutoff.timestamp_millis())?;
    if json {
        println!("{}", json!({ "deleted": deleted, "keep_days": keep_days }));
    } else {
        output::success(&format!("Dropped {} event(s).", deleted));
    }
    Ok(())
}

fn stats(json: bool) -> Result<()> {
    let log = open_log()?;
    let total = log.count()?;
    let events = log.event_counts()?;
    let rejected: u64 = events
        .iter()
        .filter(|(name, _)| name.ends_with("_rejected") || name.ends_with("_failed"))
        .map(|(_, n)| n)
        .sum();

    if json {
        let by_event: serde_json::Map<String, serde_json::Value> =
            events.into_iter().map(|(name, n)| (name, n.into())).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "total_events": total,
                "rejected_or_failed": rejected,
                "by_event": by_event,
                "database_path": log.db_path().to_string_lossy(),
            }))?
        );
        return Ok(());
    }

    println!("{}", "Wallet event log".bold());
    println!("  Events:   {}", total);
    println!("  Rejected: {}", rejected);
    println!("  Stored in {}", log.db_path().display().to_string().dimmed());

    if !events.is_empty() {
        println!();
        let mut table = output::create_table();
        table.set_header(vec!["Event", "Count"]);
        for (name, n) in events {
            table.add_row(vec![name, n.to_string()]);
        }
        println!("{}", table);
    }
    Ok(())
}
