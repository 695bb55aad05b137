//! InstaCash CLI - a TTD wallet in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{balance, catalog, doctor, history, login, logs, money, register, shell, status, AuthArgs};

/// InstaCash - send, top up, pay bills and cash out from your terminal
#[derive(Parser)]
#[command(name = "icash", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new wallet account
    Register {
        #[command(flatten)]
        auth: AuthArgs,
        /// Password (prompted when absent; INSTACASH_PASSWORD also works)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that an email and password log in
    LoginCheck {
        #[command(flatten)]
        auth: AuthArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show wallet balance and totals
    Balance {
        #[command(flatten)]
        auth: AuthArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List transactions, newest first
    History {
        #[command(flatten)]
        auth: AuthArgs,
        /// Only this kind (sent, received, topup, bill_payment, cashout)
        #[arg(long)]
        kind: Option<String>,
        /// Show at most N entries
        #[arg(long, short)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send money to another wallet
    Send {
        #[command(flatten)]
        auth: AuthArgs,
        /// Receiver email
        to: String,
        /// Amount, e.g. 40 or 12.50
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add money to the wallet
    Topup {
        #[command(flatten)]
        auth: AuthArgs,
        /// Amount, e.g. 100
        amount: String,
        /// Funding method
        #[arg(long, default_value = "Bank Transfer")]
        method: String,
        /// Optional reference for the funding transaction
        #[arg(long)]
        reference: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pay a bill
    PayBill {
        #[command(flatten)]
        auth: AuthArgs,
        /// Biller name, e.g. WASA
        biller: String,
        /// Customer account or contract number with the biller
        account_ref: String,
        /// Amount
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw to a bank account
    Cashout {
        #[command(flatten)]
        auth: AuthArgs,
        /// Bank name, e.g. Republic Bank
        bank: String,
        /// Destination bank account number
        bank_account: String,
        /// Amount
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List billers, banks and top-up methods
    Catalog {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show wallet store summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run ledger health checks
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Start an interactive session
    Shell,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Register { auth, password, json } => register::run(auth, password, json),
        Commands::LoginCheck { auth, json } => login::run(auth, json),
        Commands::Balance { auth, json } => balance::run(auth, json),
        Commands::History { auth, kind, limit, json } => history::run(auth, kind, limit, json),
        Commands::Send { auth, to, amount, json } => money::send(auth, to, amount, json),
        Commands::Topup { auth, amount, method, reference, json } => {
            money::topup(auth, amount, method, reference, json)
        }
        Commands::PayBill { auth, biller, account_ref, amount, json } => {
            money::pay_bill(auth, biller, account_ref, amount, json)
        }
        Commands::Cashout { auth, bank, bank_account, amount, json } => {
            money::cashout(auth, bank, bank_account, amount, json)
        }
        Commands::Catalog { json } => catalog::run(json),
        Commands::Status { json } => status::run(json),
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::Logs { command } => logs::run(command),
        Commands::Shell => shell::run(),
    }
}
