//! CLI command implementations

pub mod balance;
pub mod catalog;
pub mod doctor;
pub mod history;
pub mod login;
pub mod logs;
pub mod money;
pub mod register;
pub mod shell;
pub mod status;

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use dialoguer::{Input, Password};
use serde::Serialize;

use instacash_core::ports::LoadOutcome;
use instacash_core::{EntryPoint, Error, LogEvent, LoggingService, OperationResult, Session, WalletContext};

use crate::output;

pub const DATA_DIR_ENV: &str = "INSTACASH_DIR";
pub const PASSWORD_ENV: &str = "INSTACASH_PASSWORD";

/// Account selection shared by every wallet command
#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// Account email (prompted when absent)
    #[arg(long, env = "INSTACASH_EMAIL")]
    pub email: Option<String>,
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger(entry_point: EntryPoint) -> Option<LoggingService> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, entry_point, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".instacash"))
        .unwrap_or_else(|| PathBuf::from(".instacash"))
}

/// Open the wallet, noting a recovered ledger in the event log
pub fn get_context(logger: &Option<LoggingService>) -> Result<WalletContext> {
    let data_dir = get_data_dir();
    let ctx = WalletContext::new(&data_dir).context("Failed to open wallet")?;

    if let LoadOutcome::Recovered { .. } = &ctx.startup {
        log_event(logger, LogEvent::new("store_recovered").with_operation("open"));
        output::warning("The wallet file could not be read and was reset. A copy was kept next to it.");
    }

    Ok(ctx)
}

/// Read one line from piped stdin
fn read_stdin_line() -> Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Email from --email / INSTACASH_EMAIL, else prompted
pub fn resolve_email(auth: &AuthArgs) -> Result<String> {
    if let Some(email) = &auth.email {
        return Ok(email.clone());
    }
    if atty::isnt(atty::Stream::Stdin) {
        return read_stdin_line();
    }
    Ok(Input::<String>::new().with_prompt("Email").interact_text()?)
}

/// Password from INSTACASH_PASSWORD, piped stdin, or a hidden prompt
pub fn resolve_password(prompt: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    if atty::isnt(atty::Stream::Stdin) {
        return read_stdin_line();
    }
    Ok(Password::new().with_prompt(prompt).allow_empty_password(true).interact()?)
}

/// Log in for a one-shot command
pub fn authenticated_session(
    ctx: &WalletContext,
    auth: &AuthArgs,
    logger: &Option<LoggingService>,
) -> Result<Session> {
    let email = resolve_email(auth)?;
    let password = resolve_password("Password")?;

    let mut session = ctx.session();
    if let Err(e) = session.login(&email, &password) {
        log_event(
            logger,
            LogEvent::new("login_failed")
                .with_operation("login")
                .with_error(e.kind()),
        );
        return Err(anyhow!(e));
    }
    log_event(logger, LogEvent::new("login_succeeded").with_operation("login"));
    Ok(session)
}

/// Log the outcome of an operation, then print it
///
/// Success renders through `render` (or JSON). Failure is logged with its
/// error kind only and returned so the process exits non-zero.
pub fn finish<T, E, F>(
    logger: &Option<LoggingService>,
    operation: &str,
    result: std::result::Result<T, E>,
    json: bool,
    render: F,
) -> Result<()>
where
    T: Serialize,
    E: Into<Error>,
    F: FnOnce(&T),
{
    match result {
        Ok(data) => {
            log_event(
                logger,
                LogEvent::new(format!("{}_completed", operation)).with_operation(operation),
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&data))?);
            } else {
                render(&data);
            }
            Ok(())
        }
        Err(e) => {
            let e: Error = e.into();
            log_event(
                logger,
                LogEvent::new(format!("{}_rejected", operation))
                    .with_operation(operation)
                    .with_error(e.kind()),
            );
            if json {
                let failed: OperationResult<()> = OperationResult::fail_with_kind(e.to_string(), e.kind());
                println!("{}", serde_json::to_string_pretty(&failed)?);
            }
            Err(anyhow!(e))
        }
    }
}
