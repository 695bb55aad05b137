//! Result and error types for the core library
//!
//! Each component has its own small error enum so callers can match on the
//! exact rejection. `Display` strings are the short messages shown to users.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backing medium failure (save or lock). Loads never fail; see `LoadOutcome`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Ledger store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Registration failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("User already exists.")]
    AlreadyExists,

    #[error("Please enter both email and password.")]
    MissingCredentials,

    #[error("Could not secure password: {0}")]
    Credential(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Login failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("User not found.")]
    NotFound,

    #[error("Invalid login details.")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The free-text number a debit has to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceField {
    /// Customer account or contract number with a biller
    BillAccount,
    /// Destination bank account for a cashout
    BankAccount,
}

impl fmt::Display for ReferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceField::BillAccount => f.write_str("an account number"),
            ReferenceField::BankAccount => f.write_str("a bank account number"),
        }
    }
}

/// Money movement rejections
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("You cannot send money to yourself.")]
    SelfTransfer,

    #[error("Receiver not found.")]
    ReceiverNotFound,

    #[error("Amount must be greater than 0.")]
    InvalidAmount,

    #[error("Amount is too large.")]
    AmountTooLarge,

    #[error("Insufficient balance.")]
    InsufficientFunds,

    #[error("Please enter {0}.")]
    MissingReference(ReferenceField),

    #[error("Please log in first.")]
    NotAuthenticated,

    #[error("User not found in database.")]
    AccountNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AccountError {
    /// Stable identifier used in the event log (never carries user data)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyExists => "already_exists",
            Self::MissingCredentials => "missing_credentials",
            Self::Credential(_) => "credential",
            Self::Store(_) => "store_unavailable",
        }
    }
}

impl AuthError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Store(_) => "store_unavailable",
        }
    }
}

impl MoneyError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SelfTransfer => "self_transfer",
            Self::ReceiverNotFound => "receiver_not_found",
            Self::InvalidAmount => "invalid_amount",
            Self::AmountTooLarge => "amount_too_large",
            Self::InsufficientFunds => "insufficient_funds",
            Self::MissingReference(_) => "missing_reference",
            Self::NotAuthenticated => "not_authenticated",
            Self::AccountNotFound => "account_not_found",
            Self::Store(_) => "store_unavailable",
        }
    }
}

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable identifier for the event log
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Account(e) => e.kind(),
            Self::Auth(e) => e.kind(),
            Self::Money(e) => e.kind(),
            Self::Store(_) => "store_unavailable",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for `--json` output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result tagged with the error kind
    pub fn fail_with_kind(error: impl Into<String>, kind: &str) -> Self {
        let mut context = HashMap::new();
        context.insert("kind".to_string(), serde_json::Value::from(kind));
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail_with_kind(e.to_string(), e.kind()),
        }
    }
}
