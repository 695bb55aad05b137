//! Login-check command - verify credentials without doing anything else

use anyhow::Result;
use serde_json::json;

use instacash_core::{EntryPoint, OperationResult};

use super::{authenticated_session, get_context, get_logger, AuthArgs};
use crate::output;

pub fn run(auth: AuthArgs, json: bool) -> Result<()> {
    let logger = get_logger(EntryPoint::Cli);
    let ctx = get_context(&logger)?;
    let session = authenticated_session(&ctx, &auth, &logger)?;
    let account = session.account_id().unwrap_or_default();

    if json {
        let result = OperationResult::ok(json!({ "email": account, "authenticated": true }));
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::success(&format!("Login successful. Welcome, {}!", account));
    }
    Ok(())
}
