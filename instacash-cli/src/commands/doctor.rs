//! Doctor command - ledger health checks

use anyhow::{bail, Result};
use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde_json::Value;

use instacash_core::services::CheckStatus;
use instacash_core::{EntryPoint, LogEvent};

use super::{get_context, get_logger, log_event};

/// `key: value, key: value` for one detail object
fn format_detail(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}: {}", k, s),
                _ => format!("{}: {}", k, v),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

pub fn run(verbose: bool, json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context(&logger)?;
    let result = ctx.doctor_service.run_checks();

    log_event(
        &logger,
        LogEvent::new("doctor_completed").with_command("doctor").with_error_details(format!(
            "passed={} warnings={} errors={}",
            result.summary.passed, result.summary.warnings, result.summary.errors
        )),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", "Ledger Health Check".bold());
        println!();

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Check", "Status", "Message"]);

        for (check_name, check_result) in &result.checks {
            let status_cell = match check_result.status {
                CheckStatus::Pass => Cell::new("PASS").fg(Color::Green),
                CheckStatus::Warning => Cell::new("WARN").fg(Color::Yellow),
                CheckStatus::Error => Cell::new("ERROR").fg(Color::Red),
            };

            table.add_row(vec![
                Cell::new(check_name),
                status_cell,
                Cell::new(&check_result.message),
            ]);

            if verbose {
                for detail in check_result.details.iter().flatten() {
                    table.add_row(vec![
                        Cell::new(""),
                        Cell::new(""),
                        Cell::new(format!("  - {}", format_detail(detail))),
                    ]);
                }
            }
        }

        println!("{}", table);
        println!();
        println!(
            "Summary: {} passed, {} warnings, {} errors",
            result.summary.passed.to_string().green(),
            result.summary.warnings.to_string().yellow(),
            result.summary.errors.to_string().red(),
        );
    }

    if !result.is_healthy() {
        bail!("{} check(s) failed", result.summary.errors);
    }
    Ok(())
}
