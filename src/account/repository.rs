//! Repository layer for account rows

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::models::{Account, AccountId};
use crate::db::{PgTx, StoreError};
use crate::money::Money;

/// Account persistence.
///
/// `create` and `get_by_id` run in their own short transaction. The locking
/// read and the balance write run inside the caller's unit of work `Tx`.
#[async_trait]
pub trait AccountStore<Tx: Send + 'static>: Send + Sync {
    /// Insert a new account. A duplicate id yields [`StoreError::UniqueViolation`].
    async fn create(&self, id: AccountId, balance: Money) -> Result<Account, StoreError>;

    /// Plain read of the committed row.
    async fn get_by_id(&self, id: AccountId) -> Result<Account, StoreError>;

    /// Read the row and hold an exclusive row lock until `tx` ends.
    async fn get_for_update(&self, tx: &mut Tx, id: AccountId) -> Result<Account, StoreError>;

    /// Overwrite the balance and bump `updated_at`.
    async fn update_balance(
        &self,
        tx: &mut Tx,
        id: AccountId,
        balance: Money,
    ) -> Result<(), StoreError>;
}

/// PostgreSQL account repository
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let balance: Decimal = row.try_get("balance")?;
    Ok(Account {
        id: row.try_get("id")?,
        balance: Money::from_decimal(balance).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl AccountStore<PgTx> for PgAccountStore {
    async fn create(&self, id: AccountId, balance: Money) -> Result<Account, StoreError> {
        let row = sqlx::query(
            r#"INSERT INTO accounts (id, balance, created_at, updated_at)
               VALUES ($1, $2, NOW(), NOW())
               RETURNING id, balance, created_at, updated_at"#,
        )
        .bind(id)
        .bind(balance.as_decimal())
        .fetch_one(&self.pool)
        .await?;

        account_from_row(&row)
    }

    async fn get_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        let row = sqlx::query(
            r#"SELECT id, balance, created_at, updated_at
               FROM accounts WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        account_from_row(&row)
    }

    async fn get_for_update(&self, tx: &mut PgTx, id: AccountId) -> Result<Account, StoreError> {
        // NO KEY UPDATE: the pending transaction row already holds KEY SHARE on
        // both accounts through its foreign keys, and FOR UPDATE would conflict with it.
        let row = sqlx::query(
            r#"SELECT id, balance, created_at, updated_at
               FROM accounts WHERE id = $1
               FOR NO KEY UPDATE"#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        account_from_row(&row)
    }

    async fn update_balance(
        &self,
        tx: &mut PgTx,
        id: AccountId,
        balance: Money,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"UPDATE accounts SET balance = $2, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(balance.as_decimal())
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
