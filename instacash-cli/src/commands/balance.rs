//! Balance command - wallet balance and running totals

use anyhow::Result;
use colored::Colorize;

use instacash_core::EntryPoint;

use super::{authenticated_session, finish, get_context, get_logger, AuthArgs};
use crate::output;

pub fn run(auth: AuthArgs, json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context(&logger)?;
    let session = authenticated_session(&ctx, &auth, &logger)?;

    finish(&logger, "balance", session.overview(), json, |overview| {
        let currency = &overview.currency;
        println!("{}", format!("Wallet: {}", overview.account_id).bold());
        println!("Balance: {}", output::money(overview.balance, currency).green().bold());
        println!();

        let mut table = output::create_table();
        table.set_header(vec!["", "Total"]);
        let totals = &overview.totals;
        table.add_row(vec!["Topped up".to_string(), output::money(totals.topped_up, currency)]);
        table.add_row(vec!["Received".to_string(), output::money(totals.received, currency)]);
        table.add_row(vec!["Sent".to_string(), output::money(totals.sent, currency)]);
        table.add_row(vec!["Bills paid".to_string(), output::money(totals.bills_paid, currency)]);
        table.add_row(vec!["Cashed out".to_string(), output::money(totals.cashed_out, currency)]);
        println!("{}", table);
        println!("{} transaction(s) on record", overview.entry_count);
    })
}
