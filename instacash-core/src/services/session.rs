//! Session - who is logged in and which screen is showing
//!
//! A session is a plain value owned by whatever drives the UI. It binds at
//! most one account id, and every wallet operation acts on that id only.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::{AccountError, AuthError, MoneyError};
use crate::domain::{AccountId, TransactionEntry};

use super::history::{HistoryFilter, HistoryService};
use super::movement::{MovementService, Receipt};
use super::registry::RegistryService;
use super::status::{StatusService, WalletOverview};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "account", rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    Authenticated(AccountId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Login,
    Register,
    Wallet,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Register => "Register",
            Screen::Wallet => "Wallet",
        }
    }
}

pub struct Session {
    registry: Arc<RegistryService>,
    movement: Arc<MovementService>,
    history: Arc<HistoryService>,
    status: Arc<StatusService>,
    state: SessionState,
    screen: Screen,
}

impl Session {
    pub fn new(
        registry: Arc<RegistryService>,
        movement: Arc<MovementService>,
        history: Arc<HistoryService>,
        status: Arc<StatusService>,
    ) -> Self {
        Self {
            registry,
            movement,
            history,
            status,
            state: SessionState::Anonymous,
            screen: Screen::Login,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn account_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated(id) => Some(id),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.account_id().is_some()
    }

    /// Screens reachable in the current state
    pub fn menu(&self) -> Vec<Screen> {
        match self.state {
            SessionState::Anonymous => vec![Screen::Login, Screen::Register],
            SessionState::Authenticated(_) => vec![Screen::Wallet],
        }
    }

    /// Switch screens; anything not on the menu lands on the state's default
    pub fn navigate(&mut self, screen: Screen) -> Screen {
        self.screen = if self.menu().contains(&screen) {
            screen
        } else {
            self.default_screen()
        };
        self.screen
    }

    fn default_screen(&self) -> Screen {
        match self.state {
            SessionState::Anonymous => Screen::Login,
            SessionState::Authenticated(_) => Screen::Wallet,
        }
    }

    /// Create an account. The session stays anonymous.
    pub fn register(&mut self, id: &str, password: &str) -> Result<(), AccountError> {
        self.registry.register(id, password)?;
        if !self.is_authenticated() {
            self.screen = Screen::Login;
        }
        Ok(())
    }

    /// Bind the session to an account. A second login replaces the first.
    pub fn login(&mut self, id: &str, password: &str) -> Result<&str, AuthError> {
        let id = self.registry.authenticate(id.trim(), password)?;
        self.state = SessionState::Authenticated(id);
        self.screen = Screen::Wallet;
        Ok(self.account_id().unwrap_or_default())
    }

    pub fn logout(&mut self) {
        self.state = SessionState::Anonymous;
        self.screen = Screen::Login;
    }

    fn bound(&self) -> Result<&str, MoneyError> {
        self.account_id().ok_or(MoneyError::NotAuthenticated)
    }

    pub fn transfer(&self, to: &str, amount: Decimal) -> Result<Receipt, MoneyError> {
        self.movement.transfer(self.bound()?, to.trim(), amount)
    }

    pub fn top_up(
        &self,
        amount: Decimal,
        method: &str,
        reference: Option<&str>,
    ) -> Result<Receipt, MoneyError> {
        self.movement.top_up(self.bound()?, amount, method, reference)
    }

    pub fn pay_bill(
        &self,
        biller: &str,
        account_ref: &str,
        amount: Decimal,
    ) -> Result<Receipt, MoneyError> {
        self.movement.pay_bill(self.bound()?, biller, account_ref, amount)
    }

    pub fn cash_out(
        &self,
        bank: &str,
        bank_account: &str,
        amount: Decimal,
    ) -> Result<Receipt, MoneyError> {
        self.movement.cash_out(self.bound()?, bank, bank_account, amount)
    }

    pub fn overview(&self) -> Result<WalletOverview, MoneyError> {
        self.status
            .overview(self.bound()?)
            .ok_or(MoneyError::AccountNotFound)
    }

    pub fn history(&self, filter: &HistoryFilter) -> Result<Vec<TransactionEntry>, MoneyError> {
        Ok(self.history.history(self.bound()?, filter))
    }
}
