//! Ledger service facade
//!
//! The gateway talks to [`LedgerService`] only. [`Ledger`] wires the account
//! service and transfer engine to one storage backend; everything is injected
//! through the constructors, nothing is global.

use std::sync::Arc;

use async_trait::async_trait;

use crate::account::{Account, AccountId, AccountService, AccountStore, PgAccountStore};
use crate::db::{Database, MemoryDb, MemoryTx, PgTx, UnitOfWork};
use crate::error::AppError;
use crate::transfer::{
    PgTransactionStore, TransactionId, TransactionStore, TransferEngine, TransferRecord,
};

/// Operations exposed at the boundary
#[async_trait]
pub trait LedgerService: Send + Sync {
    async fn create_account(
        &self,
        id: AccountId,
        initial_balance: &str,
    ) -> Result<Account, AppError>;

    async fn get_account(&self, id: AccountId) -> Result<Account, AppError>;

    async fn transfer(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: &str,
    ) -> Result<TransferRecord, AppError>;

    async fn get_transaction(&self, id: TransactionId) -> Result<TransferRecord, AppError>;

    /// Storage liveness
    async fn health(&self) -> Result<(), AppError>;
}

/// Ledger over one storage backend
pub struct Ledger<Tx> {
    uow: Arc<dyn UnitOfWork<Tx>>,
    accounts: AccountService<Tx>,
    engine: TransferEngine<Tx>,
}

impl<Tx: Send + 'static> Ledger<Tx> {
    pub fn new(
        uow: Arc<dyn UnitOfWork<Tx>>,
        accounts: AccountService<Tx>,
        engine: TransferEngine<Tx>,
    ) -> Self {
        Self {
            uow,
            accounts,
            engine,
        }
    }
}

impl Ledger<PgTx> {
    /// PostgreSQL-backed ledger sharing `db`'s pool
    pub fn postgres(db: &Database) -> Self {
        let uow: Arc<dyn UnitOfWork<PgTx>> = Arc::new(db.clone());
        let accounts: Arc<dyn AccountStore<PgTx>> =
            Arc::new(PgAccountStore::new(db.pool().clone()));
        let transactions: Arc<dyn TransactionStore<PgTx>> =
            Arc::new(PgTransactionStore::new(db.pool().clone()));

        Self::new(
            uow.clone(),
            AccountService::new(accounts.clone()),
            TransferEngine::new(uow, accounts, transactions),
        )
    }
}

impl Ledger<MemoryTx> {
    /// In-process ledger; state lives as long as `db`
    pub fn in_memory(db: MemoryDb) -> Self {
        let db = Arc::new(db);
        let uow: Arc<dyn UnitOfWork<MemoryTx>> = db.clone();
        let accounts: Arc<dyn AccountStore<MemoryTx>> = db.clone();
        let transactions: Arc<dyn TransactionStore<MemoryTx>> = db;

        Self::new(
            uow.clone(),
            AccountService::new(accounts.clone()),
            TransferEngine::new(uow, accounts, transactions),
        )
    }
}

#[async_trait]
impl<Tx: Send + 'static> LedgerService for Ledger<Tx> {
    async fn create_account(
        &self,
        id: AccountId,
        initial_balance: &str,
    ) -> Result<Account, AppError> {
        self.accounts.create_account(id, initial_balance).await
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, AppError> {
        self.accounts.get_account(id).await
    }

    async fn transfer(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: &str,
    ) -> Result<TransferRecord, AppError> {
        self.engine.transfer(source, destination, amount).await
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<TransferRecord, AppError> {
        self.engine.get_transaction(id).await
    }

    async fn health(&self) -> Result<(), AppError> {
        self.uow
            .ping()
            .await
            .map_err(|e| AppError::storage("health check", e))
    }
}
