//! Transfer record types

use chrono::{DateTime, Utc};

use super::state::TransferStatus;
use crate::account::AccountId;
use crate::money::Money;

/// Store-assigned sequential record id
pub type TransactionId = i64;

/// Fields needed to open a pending record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTransfer {
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: Money,
}

/// Auditable record of one transfer attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub id: TransactionId,
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: Money,
    pub status: TransferStatus,
    pub created_at: DateTime<Utc>,
    /// Set only on the transition to `completed`
    pub completed_at: Option<DateTime<Utc>>,
}

impl TransferRecord {
    pub fn pending(id: TransactionId, new: &NewTransfer, now: DateTime<Utc>) -> Self {
        Self {
            id,
            source_account_id: new.source_account_id,
            destination_account_id: new.destination_account_id,
            amount: new.amount,
            status: TransferStatus::Pending,
            created_at: now,
            completed_at: None,
        }
    }

    /// Apply a status transition in place, stamping `completed_at` when completing.
    pub fn transition(&mut self, status: TransferStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == TransferStatus::Completed {
            self.completed_at = Some(now);
        }
    }
}
