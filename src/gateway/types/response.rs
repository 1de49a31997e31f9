//! Response bodies and the error envelope
//!
//! Every failure is rendered as
//! `{"error": {"code": "<CODE>", "message": "<text>"}}`
//! with the status fixed by the error kind.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::account::Account;
use crate::error::AppError;
use crate::transfer::{TransferRecord, TransferStatus};

// ============================================================================
// Error Envelope
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Stable machine-readable code
    #[schema(example = "INSUFFICIENT_BALANCE")]
    pub code: String,
    #[schema(example = "Insufficient balance in source account")]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Handler error: an [`AppError`] rendered as the error envelope
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse::new(self.0.code(), self.0.public_message());
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Response DTOs
// ============================================================================

/// Account balance view
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    #[schema(example = 1)]
    pub account_id: i64,
    /// Canonical decimal string, always 5 fractional digits:
    /// a balance of `70` or `70.00` reads back as `"70.00000"`
    #[schema(example = "70.00000", pattern = r"^\d+\.\d{5}$")]
    pub balance: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id,
            balance: account.balance.to_string(),
        }
    }
}

/// Transfer record view
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub source_account_id: i64,
    #[schema(example = 2)]
    pub destination_account_id: i64,
    /// Canonical decimal string, always 5 fractional digits
    #[schema(example = "30.00000", pattern = r"^\d+\.\d{5}$")]
    pub amount: String,
    pub status: TransferStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<TransferRecord> for TransactionResponse {
    fn from(record: TransferRecord) -> Self {
        Self {
            id: record.id,
            source_account_id: record.source_account_id,
            destination_account_id: record.destination_account_id,
            amount: record.amount.to_string(),
            status: record.status,
            created_at: record.created_at,
            completed_at: record.completed_at,
        }
    }
}

/// Health of one dependency
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    #[schema(example = "healthy")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

/// Health check response data
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "internal-transfers")]
    pub service_name: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
    pub checks: BTreeMap<String, ComponentHealth>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_error_envelope_shape() {
        let body = serde_json::to_value(ErrorResponse::new("SAME_ACCOUNT", "nope")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": {"code": "SAME_ACCOUNT", "message": "nope"}})
        );
    }

    #[test]
    fn test_api_error_status() {
        let resp = ApiError(AppError::AccountExists(1)).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = ApiError(AppError::InternalError("db down".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_account_balance_is_canonical() {
        let account = Account::new(7, Money::parse("70.00").unwrap(), Utc::now());
        let json = serde_json::to_value(AccountResponse::from(account)).unwrap();
        assert_eq!(json, serde_json::json!({"account_id": 7, "balance": "70.00000"}));
    }

    #[test]
    fn test_transaction_response_omits_missing_completion() {
        let record = TransferRecord {
            id: 3,
            source_account_id: 1,
            destination_account_id: 2,
            amount: Money::parse("1.5").unwrap(),
            status: TransferStatus::Failed,
            created_at: Utc::now(),
            completed_at: None,
        };
        let json = serde_json::to_value(TransactionResponse::from(record)).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["amount"], "1.50000");
        assert!(json.get("completed_at").is_none());
    }
}
