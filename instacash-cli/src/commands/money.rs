//! Money commands - send, topup, pay-bill, cashout
//!
//! Each one logs in, runs a single operation and prints the receipt.

use anyhow::Result;

use instacash_core::{format_money, parse_amount, EntryPoint, MoneyError, Receipt, Session};

use super::{authenticated_session, finish, get_context, get_logger, AuthArgs};
use crate::output;

fn run_operation<F, H>(auth: &AuthArgs, operation: &str, json: bool, op: F, headline: H) -> Result<()>
where
    F: FnOnce(&Session) -> Result<Receipt, MoneyError>,
    H: FnOnce(&Receipt) -> String,
{
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context(&logger)?;
    let session = authenticated_session(&ctx, auth, &logger)?;
    let currency = ctx.config.currency.clone();

    finish(&logger, operation, op(&session), json, |receipt| {
        output::receipt(receipt, &headline(receipt), &currency)
    })
}

pub fn send(auth: AuthArgs, to: String, amount: String, json: bool) -> Result<()> {
    run_operation(
        &auth,
        "transfer",
        json,
        |session| session.transfer(&to, parse_amount(&amount)?),
        |r| format!("Sent {} to {}.", format_money(r.amount), r.counterparty),
    )
}

pub fn topup(
    auth: AuthArgs,
    amount: String,
    method: String,
    reference: Option<String>,
    json: bool,
) -> Result<()> {
    run_operation(
        &auth,
        "topup",
        json,
        |session| session.top_up(parse_amount(&amount)?, &method, reference.as_deref()),
        |r| format!("Topped up {} via {}.", format_money(r.amount), r.counterparty),
    )
}

pub fn pay_bill(
    auth: AuthArgs,
    biller: String,
    account_ref: String,
    amount: String,
    json: bool,
) -> Result<()> {
    run_operation(
        &auth,
        "bill_payment",
        json,
        |session| session.pay_bill(&biller, &account_ref, parse_amount(&amount)?),
        |r| format!("Paid {} to {}.", format_money(r.amount), r.counterparty),
    )
}

pub fn cashout(
    auth: AuthArgs,
    bank: String,
    bank_account: String,
    amount: String,
    json: bool,
) -> Result<()> {
    run_operation(
        &auth,
        "cashout",
        json,
        |session| session.cash_out(&bank, &bank_account, parse_amount(&amount)?),
        |r| format!("Cashed out {} to {}.", format_money(r.amount), r.counterparty),
    )
}
