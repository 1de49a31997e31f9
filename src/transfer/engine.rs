//! Transfer Engine
//!
//! Moves funds between two accounts inside one unit of work.
//!
//! # Protocol
//!
//! ```text
//! parse amount → 0 < amount <= max → source != destination → both accounts exist
//!   BEGIN
//!     insert record (pending)
//!     lock lower id, lock higher id      ── not found ───────┐
//!     source.balance >= amount           ── insufficient ────┤
//!     destination + amount <= max        ── overflow ────────┤
//!     write both balances                                    ▼
//!     record → completed                        record → failed, COMMIT
//!   COMMIT
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Ascending Lock Order**: rows are always locked lower id first, so two
//!    transfers over the same pair (either direction) cannot wait on each other
//! 2. **Auditable Attempts**: once the record exists, every business rejection
//!    leaves it durably `failed`; balances are never written on that path
//! 3. **All or Nothing**: a storage failure rolls back the record together
//!    with any balance already written
//! 4. **Original Error Wins**: failing to mark a record `failed` is logged but
//!    never replaces the rejection the caller sees

use std::sync::Arc;

use tracing::{error, info, warn};

use super::db::TransactionStore;
use super::state::TransferStatus;
use super::types::{NewTransfer, TransactionId, TransferRecord};
use crate::account::{Account, AccountId, AccountStore};
use crate::db::{StoreError, UnitOfWork};
use crate::error::AppError;
use crate::money::Money;

/// Why the locked section stopped
enum Abort {
    /// Business rule violated; nothing written yet, the record is marked failed
    Rejected(AppError),
    /// Storage failure; the whole unit of work is rolled back
    Fatal(AppError),
}

/// Executes transfers against an account store and a transaction store
/// sharing the same unit-of-work type `Tx`.
pub struct TransferEngine<Tx> {
    uow: Arc<dyn UnitOfWork<Tx>>,
    accounts: Arc<dyn AccountStore<Tx>>,
    transactions: Arc<dyn TransactionStore<Tx>>,
    max_balance: Money,
}

impl<Tx: Send + 'static> TransferEngine<Tx> {
    pub fn new(
        uow: Arc<dyn UnitOfWork<Tx>>,
        accounts: Arc<dyn AccountStore<Tx>>,
        transactions: Arc<dyn TransactionStore<Tx>>,
    ) -> Self {
        Self::with_max_balance(uow, accounts, transactions, Money::max_balance())
    }

    /// Engine with a custom balance ceiling
    pub fn with_max_balance(
        uow: Arc<dyn UnitOfWork<Tx>>,
        accounts: Arc<dyn AccountStore<Tx>>,
        transactions: Arc<dyn TransactionStore<Tx>>,
        max_balance: Money,
    ) -> Self {
        Self {
            uow,
            accounts,
            transactions,
            max_balance,
        }
    }

    /// Move `amount_text` from `source` to `destination`.
    ///
    /// Returns the `completed` record on success. Rejections detected after the
    /// record was created leave it `failed`; earlier rejections create nothing.
    /// An `InternalError` from the commit means the outcome was not applied.
    pub async fn transfer(
        &self,
        source: AccountId,
        destination: AccountId,
        amount_text: &str,
    ) -> Result<TransferRecord, AppError> {
        let amount = Money::parse(amount_text)?;
        if !amount.is_positive() {
            return Err(AppError::AmountMustBePositive);
        }
        // no balance could ever hold it, and the record column shares the bound
        if amount > self.max_balance {
            return Err(AppError::BalanceOverflow);
        }
        if source == destination {
            return Err(AppError::SameAccount);
        }

        // Cheap rejection before opening a unit of work; the locked read stays authoritative
        self.ensure_exists(source, AppError::SourceAccountNotFound)
            .await?;
        self.ensure_exists(destination, AppError::DestinationAccountNotFound)
            .await?;

        let mut tx = self
            .uow
            .begin()
            .await
            .map_err(|e| AppError::storage("begin unit of work", e))?;

        let new = NewTransfer {
            source_account_id: source,
            destination_account_id: destination,
            amount,
        };
        let record = match self.transactions.create(&mut tx, &new).await {
            Ok(record) => record,
            Err(e) => {
                self.abandon(tx).await;
                return Err(AppError::storage("create transaction record", e));
            }
        };

        match self.execute(&mut tx, &record).await {
            Ok(completed) => {
                self.uow
                    .commit(tx)
                    .await
                    .map_err(|e| AppError::storage("commit transfer", e))?;

                info!(
                    transaction_id = completed.id,
                    source,
                    destination,
                    amount = %completed.amount,
                    "Transfer completed"
                );
                Ok(completed)
            }
            Err(Abort::Rejected(reason)) => Err(self.reject(tx, record.id, reason).await),
            Err(Abort::Fatal(err)) => {
                self.abandon(tx).await;
                Err(err)
            }
        }
    }

    /// Committed record by id
    pub async fn get_transaction(&self, id: TransactionId) -> Result<TransferRecord, AppError> {
        match self.transactions.get_by_id(id).await {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound) => Err(AppError::TransactionNotFound(id)),
            Err(e) => Err(AppError::storage("get transaction", e)),
        }
    }

    async fn ensure_exists(&self, id: AccountId, missing: AppError) -> Result<(), AppError> {
        match self.accounts.get_by_id(id).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound) => Err(missing),
            Err(e) => Err(AppError::storage("check account exists", e)),
        }
    }

    /// Locked section: lock both rows, check funds and bounds, write balances,
    /// complete the record.
    async fn execute(&self, tx: &mut Tx, record: &TransferRecord) -> Result<TransferRecord, Abort> {
        let source_id = record.source_account_id;
        let destination_id = record.destination_account_id;
        let amount = record.amount;

        let (source, destination) = if source_id < destination_id {
            let source = self.lock(tx, source_id, true).await?;
            let destination = self.lock(tx, destination_id, false).await?;
            (source, destination)
        } else {
            let destination = self.lock(tx, destination_id, false).await?;
            let source = self.lock(tx, source_id, true).await?;
            (source, destination)
        };

        if source.balance < amount {
            return Err(Abort::Rejected(AppError::InsufficientBalance));
        }

        let new_source = source.balance.checked_sub(amount).ok_or_else(|| {
            Abort::Fatal(AppError::InternalError("source balance underflow".into()))
        })?;
        let new_destination = destination
            .balance
            .checked_add(amount)
            .filter(|b| *b <= self.max_balance)
            .ok_or(Abort::Rejected(AppError::BalanceOverflow))?;

        self.accounts
            .update_balance(tx, source_id, new_source)
            .await
            .map_err(|e| Abort::Fatal(AppError::storage("update source balance", e)))?;
        self.accounts
            .update_balance(tx, destination_id, new_destination)
            .await
            .map_err(|e| Abort::Fatal(AppError::storage("update destination balance", e)))?;

        self.transactions
            .update_status(tx, record.id, TransferStatus::Completed)
            .await
            .map_err(|e| Abort::Fatal(AppError::storage("complete transaction record", e)))
    }

    async fn lock(&self, tx: &mut Tx, id: AccountId, is_source: bool) -> Result<Account, Abort> {
        match self.accounts.get_for_update(tx, id).await {
            Ok(account) => Ok(account),
            Err(StoreError::NotFound) if is_source => {
                Err(Abort::Rejected(AppError::SourceAccountNotFound))
            }
            Err(StoreError::NotFound) => {
                Err(Abort::Rejected(AppError::DestinationAccountNotFound))
            }
            Err(e) => Err(Abort::Fatal(AppError::storage("lock account", e))),
        }
    }

    /// Mark the record failed and commit it, then hand back `reason`.
    async fn reject(&self, mut tx: Tx, id: TransactionId, reason: AppError) -> AppError {
        warn!(transaction_id = id, code = reason.code(), "Transfer rejected");

        match self
            .transactions
            .update_status(&mut tx, id, TransferStatus::Failed)
            .await
        {
            Ok(_) => {
                if let Err(e) = self.uow.commit(tx).await {
                    error!(transaction_id = id, error = %e, "Failed to commit failed transaction record");
                }
            }
            Err(e) => {
                error!(transaction_id = id, error = %e, "Failed to mark transaction record failed");
                self.abandon(tx).await;
            }
        }

        reason
    }

    async fn abandon(&self, tx: Tx) {
        if let Err(e) = self.uow.rollback(tx).await {
            // the unit of work is discarded by the store either way
            warn!(error = %e, "Rollback failed");
        }
    }
}
