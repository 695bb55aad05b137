//! Register command - create a wallet account

use anyhow::Result;
use dialoguer::Password;
use serde_json::json;

use instacash_core::EntryPoint;
use rust_decimal::Decimal;

use super::{finish, get_context, get_logger, resolve_email, AuthArgs, PASSWORD_ENV};
use crate::output;

/// Password from --password, INSTACASH_PASSWORD, piped stdin, or a
/// confirmed prompt
fn new_password(flag: Option<String>) -> Result<String> {
    if let Some(p) = flag {
        return Ok(p);
    }
    if std::env::var(PASSWORD_ENV).is_ok() || atty::isnt(atty::Stream::Stdin) {
        return super::resolve_password("Password");
    }

    let p = Password::new()
        .with_prompt("Choose a password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .allow_empty_password(true)
        .interact()?;
    Ok(p)
}

pub fn run(auth: AuthArgs, password: Option<String>, json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context(&logger)?;

    let email = resolve_email(&auth)?;
    let password = new_password(password)?;

    let result = ctx
        .registry_service
        .register(&email, &password)
        .map(|()| json!({ "email": email.trim() }));

    finish(&logger, "register", result, json, |_| {
        output::success("Registration successful. You can now log in.");
        if ctx.config.starting_balance > Decimal::ZERO {
            output::info(&format!(
                "Your wallet opens with {}.",
                output::money(ctx.config.starting_balance, &ctx.config.currency)
            ));
        }
    })
}

