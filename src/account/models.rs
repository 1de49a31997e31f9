//! Account data models

use chrono::{DateTime, Utc};

use crate::money::Money;

/// Client-chosen account identifier. Always positive.
pub type AccountId = i64;

/// A balance-holding account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Fresh account with both timestamps set to `now`.
    pub fn new(id: AccountId, balance: Money, now: DateTime<Utc>) -> Self {
        Self {
            id,
            balance,
            created_at: now,
            updated_at: now,
        }
    }
}
