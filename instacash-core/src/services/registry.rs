//! Registry service - account creation and login

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::credential::{hash_password, StoredCredential};
use crate::domain::result::{AccountError, AuthError};
use crate::domain::{Account, AccountId, Argon2Params};

use super::ledger::{Ledger, Mutation};

/// Registry service for creating and authenticating accounts
pub struct RegistryService {
    ledger: Arc<Ledger>,
    starting_balance: Decimal,
    hashing: Argon2Params,
}

impl RegistryService {
    pub fn new(ledger: Arc<Ledger>, starting_balance: Decimal, hashing: Argon2Params) -> Self {
        Self {
            ledger,
            starting_balance,
            hashing,
        }
    }

    /// Create a new account
    ///
    /// The id is trimmed; the password is taken as given. New accounts open
    /// with the configured starting balance and an empty log.
    pub fn register(&self, id: &str, password: &str) -> Result<(), AccountError> {
        let id = id.trim();
        if id.is_empty() || password.is_empty() {
            return Err(AccountError::MissingCredentials);
        }

        // Hash outside the critical section; Argon2 is deliberately slow
        let credential = hash_password(password, &self.hashing).map_err(AccountError::Credential)?;

        self.ledger.transact(|snapshot| {
            if snapshot.contains(id) {
                return Err(AccountError::AlreadyExists);
            }
            snapshot.open_account(id, Account::new(credential, self.starting_balance));
            Ok(Mutation::Commit(()))
        })
    }

    /// Verify credentials and return the id to bind to a session
    ///
    /// A plaintext credential left by an older wallet is replaced by a hash
    /// the first time it verifies. If that upgrade cannot be written the
    /// login still succeeds.
    pub fn authenticate(&self, id: &str, password: &str) -> Result<AccountId, AuthError> {
        let snapshot = self.ledger.snapshot();
        let account = snapshot.account(id).ok_or(AuthError::NotFound)?;

        let credential = StoredCredential::parse(&account.password);
        if !credential.verify(password) {
            return Err(AuthError::InvalidCredentials);
        }

        if credential.is_plaintext() {
            if let Err(e) = self.upgrade_credential(id, &account.password, password) {
                eprintln!("[instacash] Could not upgrade stored credential: {}", e);
            }
        }

        Ok(id.to_string())
    }

    fn upgrade_credential(&self, id: &str, stored: &str, password: &str) -> Result<(), AuthError> {
        let hashed = match hash_password(password, &self.hashing) {
            Ok(h) => h,
            Err(e) => {
                eprintln!("[instacash] Could not hash credential: {}", e);
                return Ok(());
            }
        };

        self.ledger.transact(|snapshot| match snapshot.account_mut(id) {
            // Only replace what was verified; a concurrent change wins
            Some(account) if account.password == stored => {
                account.password = hashed;
                Ok(Mutation::Commit(()))
            }
            _ => Ok(Mutation::Discard(())),
        })
    }
}
