//! Transfer handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::warn;

use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiResult, CreateTransactionRequest, ErrorResponse, TransactionResponse,
    ValidatedJson,
};
use crate::error::AppError;
use crate::transfer::TransactionId;

/// Create transaction endpoint
///
/// POST /api/v1/transactions
///
/// Runs the transfer to completion before answering. When the request
/// deadline passes first, the in-flight unit of work is dropped and rolled back.
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transfer completed"),
        (status = 400, description = "Validation failed, insufficient balance or overflow", body = ErrorResponse),
        (status = 404, description = "Source or destination account not found", body = ErrorResponse),
        (status = 500, description = "Internal error; the transfer was not applied", body = ErrorResponse)
    ),
    tag = "Transactions"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateTransactionRequest>,
) -> ApiResult<StatusCode> {
    let (Some(source), Some(destination), Some(amount)) = (
        req.source_account_id,
        req.destination_account_id,
        req.amount,
    ) else {
        return Err(AppError::ValidationError("Request validation failed".into()).into());
    };

    let transfer = state.ledger.transfer(source, destination, &amount);
    match tokio::time::timeout(state.request_timeout, transfer).await {
        Ok(result) => {
            result?;
            Ok(StatusCode::CREATED)
        }
        Err(_) => {
            warn!(
                source,
                destination,
                timeout_ms = state.request_timeout.as_millis() as u64,
                "Transfer cancelled by request timeout"
            );
            Err(AppError::InternalError("request timed out".into()).into())
        }
    }
}

/// Get transaction endpoint
///
/// GET /api/v1/transactions/{transaction_id}
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{transaction_id}",
    params(("transaction_id" = i64, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction found", body = TransactionResponse),
        (status = 400, description = "Malformed transaction id", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    ),
    tag = "Transactions"
)]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<TransactionResponse>> {
    let id = raw_id
        .parse::<TransactionId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            ApiError(AppError::ValidationError(
                "transaction_id must be a positive integer".into(),
            ))
        })?;

    let record = state.ledger.get_transaction(id).await?;
    Ok(Json(record.into()))
}
