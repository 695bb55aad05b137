//! Shell command - interactive wallet session
//!
//! Anonymous users get Login / Register. Once logged in the Wallet menu
//! offers every money operation until Logout or Quit.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password, Select};

use instacash_core::services::Screen;
use instacash_core::{
    parse_amount, Catalog, EntryPoint, HistoryFilter, LogEvent, LoggingService, MoneyError,
    Receipt, Session, WalletContext,
};

use super::{get_context, get_logger, log_event};
use crate::commands::history::print_entries;
use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalletAction {
    Balance,
    Send,
    TopUp,
    PayBill,
    Cashout,
    History,
    Logout,
    Quit,
}

impl WalletAction {
    const ALL: [WalletAction; 8] = [
        WalletAction::Balance,
        WalletAction::Send,
        WalletAction::TopUp,
        WalletAction::PayBill,
        WalletAction::Cashout,
        WalletAction::History,
        WalletAction::Logout,
        WalletAction::Quit,
    ];

    fn label(&self) -> &'static str {
        match self {
            WalletAction::Balance => "Balance",
            WalletAction::Send => "Send Money",
            WalletAction::TopUp => "Top Up",
            WalletAction::PayBill => "Pay Bill",
            WalletAction::Cashout => "Cashout",
            WalletAction::History => "History",
            WalletAction::Logout => "Logout",
            WalletAction::Quit => "Quit",
        }
    }
}

struct Shell<'a> {
    ctx: &'a WalletContext,
    session: Session,
    logger: Option<LoggingService>,
}

pub fn run() -> Result<()> {
    let logger = get_logger(EntryPoint::Shell);
    let ctx = get_context(&logger)?;
    log_event(&logger, LogEvent::new("shell_started"));

    println!("{}", "InstaCash Wallet".bold());
    println!();

    let mut shell = Shell {
        ctx: &ctx,
        session: ctx.session(),
        logger,
    };

    loop {
        let keep_going = match shell.session.screen() {
            Screen::Login | Screen::Register => shell.anonymous_menu()?,
            Screen::Wallet => shell.wallet_menu()?,
        };
        if !keep_going {
            break;
        }
    }

    log_event(&shell.logger, LogEvent::new("shell_closed"));
    Ok(())
}

fn prompt_amount() -> Result<String> {
    Ok(Input::<String>::new().with_prompt("Amount").interact_text()?)
}

/// Pick from a catalog list; `None` when the list is empty
fn pick(prompt: &str, names: &[String]) -> Result<Option<String>> {
    if names.is_empty() {
        return Ok(None);
    }
    let index = Select::new()
        .with_prompt(prompt)
        .items(names)
        .default(0)
        .interact()?;
    Ok(names.get(index).cloned())
}

impl Shell<'_> {
    fn log(&self, event: LogEvent) {
        let screen = match self.session.screen() {
            Screen::Login => "login",
            Screen::Register => "register",
            Screen::Wallet => "wallet",
        };
        log_event(&self.logger, event.with_screen(screen));
    }

    fn catalog(&self) -> &Catalog {
        &self.ctx.config.catalog
    }

    /// Returns false when the user chose to quit
    fn anonymous_menu(&mut self) -> Result<bool> {
        let screens = self.session.menu();
        let mut items: Vec<&str> = screens.iter().map(|s| s.title()).collect();
        items.push("Quit");

        let current = screens.iter().position(|s| *s == self.session.screen()).unwrap_or(0);
        let choice = Select::new()
            .with_prompt("Welcome")
            .items(&items)
            .default(current)
            .interact()?;

        let Some(screen) = screens.get(choice).copied() else {
            return Ok(false);
        };

        match self.session.navigate(screen) {
            Screen::Register => self.register()?,
            _ => self.login()?,
        }
        Ok(true)
    }

    fn login(&mut self) -> Result<()> {
        let email: String = Input::new().with_prompt("Email").interact_text()?;
        let password = Password::new().with_prompt("Password").allow_empty_password(true).interact()?;

        match self.session.login(&email, &password).map(str::to_string) {
            Ok(id) => {
                output::success(&format!("Login successful. Welcome, {}!", id));
                self.log(LogEvent::new("login_succeeded").with_operation("login"));
            }
            Err(e) => {
                output::error(&e.to_string());
                self.log(LogEvent::new("login_failed").with_operation("login").with_error(e.kind()));
            }
        }
        Ok(())
    }

    fn register(&mut self) -> Result<()> {
        let email: String = Input::new().with_prompt("Email").allow_empty(true).interact_text()?;
        let password = Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .allow_empty_password(true)
            .interact()?;

        match self.session.register(&email, &password) {
            Ok(()) => {
                output::success("Registration successful. You can now log in.");
                self.log(LogEvent::new("register_completed").with_operation("register"));
            }
            Err(e) => {
                output::error(&e.to_string());
                self.log(
                    LogEvent::new("register_rejected")
                        .with_operation("register")
                        .with_error(e.kind()),
                );
            }
        }
        Ok(())
    }

    /// Returns false when the user chose to quit
    fn wallet_menu(&mut self) -> Result<bool> {
        println!();
        if let Ok(overview) = self.session.overview() {
            println!(
                "{} {}",
                "Balance:".bold(),
                output::money(overview.balance, &overview.currency).green().bold()
            );
        }

        let labels: Vec<&str> = WalletAction::ALL.iter().map(|a| a.label()).collect();
        let choice = Select::new()
            .with_prompt("Wallet")
            .items(&labels)
            .default(0)
            .interact()?;
        let action = WalletAction::ALL.get(choice).copied().unwrap_or(WalletAction::Quit);

        match action {
            WalletAction::Balance => self.balance(),
            WalletAction::Send => self.send()?,
            WalletAction::TopUp => self.top_up()?,
            WalletAction::PayBill => self.pay_bill()?,
            WalletAction::Cashout => self.cash_out()?,
            WalletAction::History => self.history(),
            WalletAction::Logout => {
                self.session.logout();
                self.log(LogEvent::new("logout").with_operation("logout"));
                output::info("Logged out.");
            }
            WalletAction::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn report(&self, operation: &str, result: Result<Receipt, MoneyError>, headline: &str) {
        match result {
            Ok(receipt) => {
                output::receipt(&receipt, headline, &self.ctx.config.currency);
                self.log(LogEvent::new(format!("{}_completed", operation)).with_operation(operation));
            }
            Err(e) => {
                output::error(&e.to_string());
                self.log(
                    LogEvent::new(format!("{}_rejected", operation))
                        .with_operation(operation)
                        .with_error(e.kind()),
                );
            }
        }
    }

    fn balance(&self) {
        match self.session.overview() {
            Ok(overview) => {
                let currency = &overview.currency;
                let mut table = output::create_table();
                table.set_header(vec!["", "Total"]);
                let totals = &overview.totals;
                for (label, amount) in [
                    ("Balance", overview.balance),
                    ("Topped up", totals.topped_up),
                    ("Received", totals.received),
                    ("Sent", totals.sent),
                    ("Bills paid", totals.bills_paid),
                    ("Cashed out", totals.cashed_out),
                ] {
                    table.add_row(vec![label.to_string(), output::money(amount, currency)]);
                }
                println!("{}", table);
            }
            Err(e) => output::error(&e.to_string()),
        }
    }

    fn send(&self) -> Result<()> {
        let to: String = Input::new().with_prompt("Receiver email").interact_text()?;
        let amount = prompt_amount()?;
        let result = parse_amount(&amount).and_then(|a| self.session.transfer(&to, a));
        self.report("transfer", result, "Transfer successful.");
        Ok(())
    }

    fn top_up(&self) -> Result<()> {
        let Some(method) = pick("Top-up method", &self.catalog().topup_methods)? else {
            output::warning("No top-up methods configured.");
            return Ok(());
        };
        let amount = prompt_amount()?;
        let reference: String = Input::new()
            .with_prompt("Reference (optional)")
            .allow_empty(true)
            .interact_text()?;

        let result = parse_amount(&amount)
            .and_then(|a| self.session.top_up(a, &method, Some(reference.as_str())));
        self.report("topup", result, "Top-up successful.");
        Ok(())
    }

    fn pay_bill(&self) -> Result<()> {
        let Some(biller) = pick("Biller", &self.catalog().billers)? else {
            output::warning("No billers configured.");
            return Ok(());
        };
        let account_ref: String = Input::new()
            .with_prompt("Account / contract number")
            .allow_empty(true)
            .interact_text()?;
        let amount = prompt_amount()?;

        let result =
            parse_amount(&amount).and_then(|a| self.session.pay_bill(&biller, &account_ref, a));
        self.report("bill_payment", result, &format!("Payment to {} successful.", biller));
        Ok(())
    }

    fn cash_out(&self) -> Result<()> {
        let Some(bank) = pick("Bank", &self.catalog().banks)? else {
            output::warning("No banks configured.");
            return Ok(());
        };
        let bank_account: String = Input::new()
            .with_prompt("Bank account number")
            .allow_empty(true)
            .interact_text()?;
        let amount = prompt_amount()?;

        let result =
            parse_amount(&amount).and_then(|a| self.session.cash_out(&bank, &bank_account, a));
        self.report("cashout", result, &format!("Cashout to {} successful.", bank));
        Ok(())
    }

    fn history(&self) {
        match self.session.history(&HistoryFilter::all().with_limit(20)) {
            Ok(entries) => print_entries(&entries),
            Err(e) => output::error(&e.to_string()),
        }
    }
}
