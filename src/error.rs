//! Error Taxonomy
//!
//! Every failure surfaced to a caller is one of these kinds. Each kind has a
//! stable machine-readable code and exactly one HTTP status.

use thiserror::Error;
use tracing::error;

use crate::account::AccountId;
use crate::db::StoreError;
use crate::money::MoneyError;
use crate::transfer::TransactionId;

/// Classified application error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // === Format / Validation Errors ===
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Initial balance cannot be negative")]
    InvalidBalance,

    #[error("Amount must be positive")]
    AmountMustBePositive,

    #[error("Source and destination accounts must be different")]
    SameAccount,

    #[error("Invalid account ID format")]
    InvalidAccountId,

    #[error("{0}")]
    ValidationError(String),

    #[error("Invalid request format: {0}")]
    InvalidRequest(String),

    // === Account Errors ===
    #[error("Account with ID {0} already exists")]
    AccountExists(AccountId),

    #[error("Account with ID {0} not found")]
    AccountNotFound(AccountId),

    #[error("Source account not found")]
    SourceAccountNotFound,

    #[error("Destination account not found")]
    DestinationAccountNotFound,

    #[error("Insufficient balance in source account")]
    InsufficientBalance,

    #[error("Transaction would exceed maximum account balance")]
    BalanceOverflow,

    // === Transaction Record Errors ===
    #[error("Transaction with ID {0} not found")]
    TransactionNotFound(TransactionId),

    // === System Errors ===
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidFormat(_) => "INVALID_FORMAT",
            AppError::InvalidBalance => "INVALID_BALANCE",
            AppError::AmountMustBePositive => "INVALID_AMOUNT",
            AppError::SameAccount => "SAME_ACCOUNT",
            AppError::InvalidAccountId => "INVALID_ACCOUNT_ID",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::AccountExists(_) => "ACCOUNT_EXISTS",
            AppError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            AppError::SourceAccountNotFound => "SOURCE_NOT_FOUND",
            AppError::DestinationAccountNotFound => "DESTINATION_NOT_FOUND",
            AppError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            AppError::BalanceOverflow => "BALANCE_OVERFLOW",
            AppError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::InvalidFormat(_)
            | AppError::InvalidBalance
            | AppError::AmountMustBePositive
            | AppError::SameAccount
            | AppError::InvalidAccountId
            | AppError::ValidationError(_)
            | AppError::InvalidRequest(_)
            | AppError::InsufficientBalance
            | AppError::BalanceOverflow => 400,
            AppError::AccountNotFound(_)
            | AppError::SourceAccountNotFound
            | AppError::DestinationAccountNotFound
            | AppError::TransactionNotFound(_) => 404,
            AppError::AccountExists(_) => 409,
            AppError::InternalError(_) => 500,
        }
    }

    /// Message safe to show to a caller. Internal details never leave the process.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InternalError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Wrap a storage failure that matches no business condition.
    ///
    /// Logged here so the full context survives even though callers only see
    /// the generic message.
    pub fn storage(operation: &'static str, err: StoreError) -> Self {
        error!(operation, error = %err, "storage failure");
        AppError::InternalError(format!("{}: {}", operation, err))
    }
}

impl From<MoneyError> for AppError {
    fn from(e: MoneyError) -> Self {
        AppError::InvalidFormat(e.to_string())
    }
}
