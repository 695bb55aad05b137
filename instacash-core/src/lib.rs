//! InstaCash Core - wallet ledger for TTD accounts
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Accounts, transaction entries, money and credentials
//! - **ports**: The `LedgerStore` trait the services persist through
//! - **services**: Registration, money movement, history, sessions
//! - **adapters**: JSON file and in-memory stores

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::json_file::JsonFileStore;
use config::Config;
use ports::{LedgerStore, LoadOutcome};
use services::*;

// Re-export commonly used types at crate root
pub use config::Catalog;
pub use domain::result::{
    AccountError, AuthError, Error, MoneyError, OperationResult, ReferenceField, StoreError,
};
pub use domain::{
    format_money, parse_amount, Account, AccountId, LedgerSnapshot, TransactionEntry,
    TransactionKind,
};
pub use services::{EntryPoint, HistoryFilter, LogEvent, LoggingService, Receipt, Session};

/// Ledger file name inside the data directory
pub const LEDGER_FILE: &str = "wallet.json";

/// Main context for wallet operations
///
/// Holds the configuration, the shared store and every service. All
/// services share one `Ledger`, so mutations from any of them are
/// serialized against each other.
pub struct WalletContext {
    pub config: Config,
    pub store: Arc<dyn LedgerStore>,
    pub ledger: Arc<Ledger>,
    pub registry_service: Arc<RegistryService>,
    pub movement_service: Arc<MovementService>,
    pub history_service: Arc<HistoryService>,
    pub status_service: Arc<StatusService>,
    pub doctor_service: DoctorService,
    /// How the ledger looked when the context was opened
    pub startup: LoadOutcome,
    data_dir: Option<PathBuf>,
}

impl WalletContext {
    /// Open the wallet stored in `data_dir`, creating it on first use
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = Config::load(data_dir)?;
        let store: Arc<dyn LedgerStore> = Arc::new(JsonFileStore::new(data_dir.join(LEDGER_FILE)));

        let mut context = Self::with_store(config, store);
        context.data_dir = Some(data_dir.to_path_buf());
        Ok(context)
    }

    /// Build a context over any store (tests use `MemoryStore`)
    pub fn with_store(config: Config, store: Arc<dyn LedgerStore>) -> Self {
        let startup = store.load_report().outcome;
        if startup == LoadOutcome::Fresh {
            if let Err(e) = store.create_if_missing() {
                eprintln!("[instacash] Could not create ledger: {}", e);
            }
        }
        let ledger = Arc::new(Ledger::new(Arc::clone(&store)));

        let registry_service = Arc::new(RegistryService::new(
            Arc::clone(&ledger),
            config.starting_balance,
            config.password_hashing.clone(),
        ));
        let movement_service = Arc::new(MovementService::new(Arc::clone(&ledger)));
        let history_service = Arc::new(HistoryService::new(Arc::clone(&ledger)));
        let status_service = Arc::new(StatusService::new(Arc::clone(&ledger), config.currency.clone()));
        let doctor_service = DoctorService::new(Arc::clone(&ledger));

        Self {
            config,
            store,
            ledger,
            registry_service,
            movement_service,
            history_service,
            status_service,
            doctor_service,
            startup,
            data_dir: None,
        }
    }

    /// A fresh anonymous session over this wallet
    pub fn session(&self) -> Session {
        Session::new(
            Arc::clone(&self.registry_service),
            Arc::clone(&self.movement_service),
            Arc::clone(&self.history_service),
            Arc::clone(&self.status_service),
        )
    }

    /// Directory the wallet was opened from, if it is file backed
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }
}
