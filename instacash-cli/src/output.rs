//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

use instacash_core::{format_money, Receipt};
use rust_decimal::Decimal;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// `$1,234.50 TTD`
pub fn money(amount: Decimal, currency: &str) -> String {
    format!("{} {}", format_money(amount), currency)
}

/// Confirmation line plus new balance after a committed operation
pub fn receipt(receipt: &Receipt, headline: &str, currency: &str) {
    success(headline);
    println!("  New balance: {}", money(receipt.balance_after, currency).bold());
    println!("  Receipt:     {}", receipt.receipt.to_string().dimmed());
    println!("  Time:        {}", receipt.timestamp.dimmed());
}
