//! In-process storage backend
//!
//! Same contract as the PostgreSQL backend, kept entirely in memory:
//! - committed rows live behind one `RwLock`
//! - every account row has its own async mutex; a unit of work holds the
//!   owned guard until commit, rollback or drop
//! - writes are buffered in the [`MemoryTx`] and applied in one step on commit
//!
//! Lock waits are bounded by `lock_timeout` and surface as
//! [`StoreError::LockTimeout`], mirroring `SET LOCAL lock_timeout`.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::{StoreError, UnitOfWork};
use crate::account::{Account, AccountId, AccountStore};
use crate::money::Money;
use crate::transfer::{NewTransfer, TransactionId, TransactionStore, TransferRecord, TransferStatus};

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    transactions: HashMap<TransactionId, TransferRecord>,
}

struct Inner {
    tables: RwLock<Tables>,
    row_locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
    next_transaction_id: AtomicI64,
    lock_timeout: Duration,
}

/// In-memory database. Cloning shares the same tables.
#[derive(Clone)]
pub struct MemoryDb {
    inner: Arc<Inner>,
}

/// Unit of work against [`MemoryDb`]. Dropping it discards its writes and
/// releases its row locks.
#[derive(Default)]
pub struct MemoryTx {
    held: HashMap<AccountId, OwnedMutexGuard<()>>,
    accounts: HashMap<AccountId, Account>,
    transactions: HashMap<TransactionId, TransferRecord>,
}

impl MemoryTx {
    /// Ids of the account rows this unit of work currently holds locked.
    pub fn locked_accounts(&self) -> Vec<AccountId> {
        let mut ids: Vec<_> = self.held.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl MemoryDb {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: RwLock::new(Tables::default()),
                row_locks: Mutex::new(HashMap::new()),
                next_transaction_id: AtomicI64::new(1),
                lock_timeout,
            }),
        }
    }

    /// Number of committed transfer records
    pub async fn transaction_count(&self) -> usize {
        self.inner.tables.read().await.transactions.len()
    }

    async fn lock_row(&self, tx: &mut MemoryTx, id: AccountId) -> Result<(), StoreError> {
        if tx.held.contains_key(&id) {
            return Ok(());
        }

        let row_lock = {
            let mut locks = self.inner.row_locks.lock().await;
            locks.entry(id).or_default().clone()
        };

        let guard = tokio::time::timeout(self.inner.lock_timeout, row_lock.lock_owned())
            .await
            .map_err(|_| StoreError::LockTimeout)?;
        tx.held.insert(id, guard);
        Ok(())
    }

    /// Row as seen from inside `tx`: its own buffered write first, then the committed table.
    async fn visible_account(&self, tx: &MemoryTx, id: AccountId) -> Result<Account, StoreError> {
        if let Some(account) = tx.accounts.get(&id) {
            return Ok(account.clone());
        }
        self.inner
            .tables
            .read()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn visible_record(
        &self,
        tx: &MemoryTx,
        id: TransactionId,
    ) -> Result<TransferRecord, StoreError> {
        if let Some(record) = tx.transactions.get(&id) {
            return Ok(record.clone());
        }
        self.inner
            .tables
            .read()
            .await
            .transactions
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

impl Default for MemoryDb {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl UnitOfWork<MemoryTx> for MemoryDb {
    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        Ok(MemoryTx::default())
    }

    async fn commit(&self, tx: MemoryTx) -> Result<(), StoreError> {
        let MemoryTx {
            held,
            accounts,
            transactions,
        } = tx;

        {
            let mut tables = self.inner.tables.write().await;
            tables.accounts.extend(accounts);
            tables.transactions.extend(transactions);
        }

        // visible before anyone waiting on these rows can read them
        drop(held);
        Ok(())
    }

    async fn rollback(&self, tx: MemoryTx) -> Result<(), StoreError> {
        drop(tx);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl AccountStore<MemoryTx> for MemoryDb {
    async fn create(&self, id: AccountId, balance: Money) -> Result<Account, StoreError> {
        if balance.is_negative() {
            return Err(StoreError::CheckViolation);
        }

        let mut tables = self.inner.tables.write().await;
        if tables.accounts.contains_key(&id) {
            return Err(StoreError::UniqueViolation);
        }

        let account = Account::new(id, balance, Utc::now());
        tables.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn get_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        self.inner
            .tables
            .read()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_for_update(&self, tx: &mut MemoryTx, id: AccountId) -> Result<Account, StoreError> {
        // a missing row yields nothing to lock
        if !tx.accounts.contains_key(&id) {
            AccountStore::get_by_id(self, id).await?;
        }
        self.lock_row(tx, id).await?;
        self.visible_account(tx, id).await
    }

    async fn update_balance(
        &self,
        tx: &mut MemoryTx,
        id: AccountId,
        balance: Money,
    ) -> Result<(), StoreError> {
        if balance.is_negative() {
            return Err(StoreError::CheckViolation);
        }

        self.lock_row(tx, id).await?;
        let mut account = self.visible_account(tx, id).await?;
        account.balance = balance;
        account.updated_at = Utc::now();
        tx.accounts.insert(id, account);
        Ok(())
    }
}

#[async_trait]
impl TransactionStore<MemoryTx> for MemoryDb {
    async fn create(
        &self,
        tx: &mut MemoryTx,
        new: &NewTransfer,
    ) -> Result<TransferRecord, StoreError> {
        if !new.amount.is_positive() {
            return Err(StoreError::CheckViolation);
        }

        let id = self.inner.next_transaction_id.fetch_add(1, Ordering::Relaxed);
        let record = TransferRecord::pending(id, new, Utc::now());
        tx.transactions.insert(id, record.clone());
        Ok(record)
    }

    async fn update_status(
        &self,
        tx: &mut MemoryTx,
        id: TransactionId,
        status: TransferStatus,
    ) -> Result<TransferRecord, StoreError> {
        let mut record = self.visible_record(tx, id).await?;
        if !record.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: record.status,
                to: status,
            });
        }

        record.transition(status, Utc::now());
        tx.transactions.insert(id, record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: TransactionId) -> Result<TransferRecord, StoreError> {
        self.inner
            .tables
            .read()
            .await
            .transactions
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}
