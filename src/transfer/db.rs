//! Transfer Record Database Layer
//!
//! Status updates are atomic CAS operations: a row only moves if it is still
//! `pending`, so a terminal record can never be rewritten.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::state::TransferStatus;
use super::types::{NewTransfer, TransactionId, TransferRecord};
use crate::db::{PgTx, StoreError};
use crate::money::Money;

/// Transfer record persistence
#[async_trait]
pub trait TransactionStore<Tx: Send + 'static>: Send + Sync {
    /// Insert a `pending` record inside `tx`; the store assigns the id.
    async fn create(&self, tx: &mut Tx, new: &NewTransfer) -> Result<TransferRecord, StoreError>;

    /// Move a `pending` record to a terminal status inside `tx`.
    ///
    /// Fails with [`StoreError::NotFound`] if the row is missing and
    /// [`StoreError::InvalidTransition`] if it is already terminal.
    async fn update_status(
        &self,
        tx: &mut Tx,
        id: TransactionId,
        status: TransferStatus,
    ) -> Result<TransferRecord, StoreError>;

    /// Committed record, for result lookup.
    async fn get_by_id(&self, id: TransactionId) -> Result<TransferRecord, StoreError>;
}

const RECORD_COLUMNS: &str =
    "id, source_account_id, destination_account_id, amount, status, created_at, completed_at";

/// PostgreSQL transfer record repository
#[derive(Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &PgRow) -> Result<TransferRecord, StoreError> {
        let status: String = row.try_get("status")?;
        let status = status.parse::<TransferStatus>().map_err(StoreError::Corrupt)?;

        let amount: Decimal = row.try_get("amount")?;
        let amount = Money::from_decimal(amount).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        Ok(TransferRecord {
            id: row.try_get("id")?,
            source_account_id: row.try_get("source_account_id")?,
            destination_account_id: row.try_get("destination_account_id")?,
            amount,
            status,
            created_at: row.try_get("created_at")?,
            completed_at: row.try_get("completed_at")?,
        })
    }
}

#[async_trait]
impl TransactionStore<PgTx> for PgTransactionStore {
    async fn create(&self, tx: &mut PgTx, new: &NewTransfer) -> Result<TransferRecord, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO transactions
                (source_account_id, destination_account_id, amount, status, created_at)
            VALUES
                ($1, $2, $3, $4, NOW())
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(new.source_account_id)
            .bind(new.destination_account_id)
            .bind(new.amount.as_decimal())
            .bind(TransferStatus::Pending.as_str())
            .fetch_one(&mut **tx)
            .await?;

        Self::row_to_record(&row)
    }

    async fn update_status(
        &self,
        tx: &mut PgTx,
        id: TransactionId,
        status: TransferStatus,
    ) -> Result<TransferRecord, StoreError> {
        let completed_at: Option<DateTime<Utc>> =
            (status == TransferStatus::Completed).then(Utc::now);

        let sql = format!(
            r#"
            UPDATE transactions
            SET status = $2, completed_at = $3
            WHERE id = $1 AND status = $4
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(completed_at)
            .bind(TransferStatus::Pending.as_str())
            .fetch_optional(&mut **tx)
            .await?;

        if let Some(row) = row {
            return Self::row_to_record(&row);
        }

        // CAS missed: either the row is gone or it is already terminal
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM transactions WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;

        match current {
            None => Err(StoreError::NotFound),
            Some(from) => Err(StoreError::InvalidTransition {
                from: from.parse().map_err(StoreError::Corrupt)?,
                to: status,
            }),
        }
    }

    async fn get_by_id(&self, id: TransactionId) -> Result<TransferRecord, StoreError> {
        let sql = format!("SELECT {} FROM transactions WHERE id = $1", RECORD_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        Self::row_to_record(&row)
    }
}
