//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "startingBalance": "0.00",
//!   "currency": "TTD",
//!   "billers": ["T&TEC Electricity", "WASA"],
//!   "banks": ["Republic Bank"],
//!   "topupMethods": ["Bank Transfer"],
//!   "passwordHashing": { "timeCost": 3, "memoryCost": 65536, "parallelism": 4, "hashLen": 32 }
//! }
//! ```
//! Every key is optional and unknown keys are ignored.

use std::path::Path;

use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::result::Error;
use crate::domain::{parse_amount, Argon2Params, DEFAULT_CURRENCY};

pub const SETTINGS_FILE: &str = "settings.json";
pub const STARTING_BALANCE_ENV: &str = "INSTACASH_STARTING_BALANCE";

const DEFAULT_BILLERS: &[&str] = &[
    "T&TEC Electricity",
    "WASA",
    "TSTT",
    "Digicel",
    "FLOW",
    "Amplia",
    "Bmobile",
    "Courts",
    "Internet",
];

const DEFAULT_BANKS: &[&str] = &[
    "Republic Bank",
    "First Citizens",
    "RBC Royal Bank",
    "Scotiabank",
    "JMMB",
    "Other",
];

const DEFAULT_TOPUP_METHODS: &[&str] = &["Bank Transfer", "Credit/Debit Card", "Cash at Agent"];

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SettingsFile {
    starting_balance: Option<Decimal>,
    currency: Option<String>,
    billers: Option<Vec<String>>,
    banks: Option<Vec<String>>,
    topup_methods: Option<Vec<String>>,
    password_hashing: Option<Argon2Params>,
}

/// Names offered by the interactive shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub billers: Vec<String>,
    pub banks: Vec<String>,
    pub topup_methods: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            billers: owned(DEFAULT_BILLERS),
            banks: owned(DEFAULT_BANKS),
            topup_methods: owned(DEFAULT_TOPUP_METHODS),
        }
    }
}

/// Wallet configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub starting_balance: Decimal,
    pub currency: String,
    pub catalog: Catalog,
    pub password_hashing: Argon2Params,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(SettingsFile::default())
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing or unreadable settings file yields the defaults. The
    /// starting balance can be overridden with INSTACASH_STARTING_BALANCE.
    /// A negative starting balance, from either place, is a config error.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(&data_dir.join(SETTINGS_FILE));
        let mut config = Self::from_settings(raw);

        if config.starting_balance < Decimal::ZERO {
            return Err(Error::config(format!(
                "startingBalance in {} must not be negative, got {}",
                SETTINGS_FILE, config.starting_balance
            ))
            .into());
        }

        if let Ok(value) = std::env::var(STARTING_BALANCE_ENV) {
            config.apply_starting_balance(&value)?;
        }

        Ok(config)
    }

    fn from_settings(raw: SettingsFile) -> Self {
        let defaults = Catalog::default();
        Self {
            starting_balance: raw.starting_balance.unwrap_or(Decimal::ZERO),
            currency: raw.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            catalog: Catalog {
                billers: raw.billers.unwrap_or(defaults.billers),
                banks: raw.banks.unwrap_or(defaults.banks),
                topup_methods: raw.topup_methods.unwrap_or(defaults.topup_methods),
            },
            password_hashing: raw.password_hashing.unwrap_or_default(),
        }
    }

    fn apply_starting_balance(&mut self, value: &str) -> Result<()> {
        let amount = parse_amount(value)
            .ok()
            .filter(|a| *a >= Decimal::ZERO)
            .ok_or_else(|| {
                Error::config(format!(
                    "{} must be a non-negative amount, got {:?}",
                    STARTING_BALANCE_ENV, value
                ))
            })?;
        self.starting_balance = amount;
        Ok(())
    }
}

fn read_settings(path: &Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            eprintln!("[instacash] Ignoring unreadable {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}
