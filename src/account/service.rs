//! Account creation and lookup

use std::sync::Arc;

use tracing::info;

use super::models::{Account, AccountId};
use super::repository::AccountStore;
use crate::db::StoreError;
use crate::error::AppError;
use crate::money::Money;

/// Creates accounts and reads them back.
pub struct AccountService<Tx> {
    accounts: Arc<dyn AccountStore<Tx>>,
}

impl<Tx: Send + 'static> AccountService<Tx> {
    pub fn new(accounts: Arc<dyn AccountStore<Tx>>) -> Self {
        Self { accounts }
    }

    /// Open an account with a client-chosen id and a starting balance.
    ///
    /// Balance checks run before any storage call, so a rejected request never
    /// touches the database.
    pub async fn create_account(
        &self,
        id: AccountId,
        initial_balance: &str,
    ) -> Result<Account, AppError> {
        let balance = Money::parse(initial_balance)?;
        if balance.is_negative() {
            return Err(AppError::InvalidBalance);
        }
        if balance.exceeds_max_balance() {
            return Err(AppError::BalanceOverflow);
        }

        match self.accounts.create(id, balance).await {
            Ok(account) => {
                info!(account_id = id, balance = %account.balance, "Account created");
                Ok(account)
            }
            Err(StoreError::UniqueViolation) => Err(AppError::AccountExists(id)),
            Err(e) => Err(AppError::storage("create account", e)),
        }
    }

    /// Current committed state of one account.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, AppError> {
        match self.accounts.get_by_id(id).await {
            Ok(account) => Ok(account),
            Err(StoreError::NotFound) => Err(AppError::AccountNotFound(id)),
            Err(e) => Err(AppError::storage("get account", e)),
        }
    }
}
