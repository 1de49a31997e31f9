//! Account handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::super::state::AppState;
use super::super::types::{
    AccountResponse, ApiError, ApiResult, CreateAccountRequest, ErrorResponse, ValidatedJson,
};
use crate::account::AccountId;
use crate::error::AppError;

/// Create account endpoint
///
/// POST /api/v1/accounts
///
/// Succeeds with `201 Created` and no body.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Validation failed or invalid balance", body = ErrorResponse),
        (status = 409, description = "Account id already taken", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateAccountRequest>,
) -> ApiResult<StatusCode> {
    let (Some(account_id), Some(initial_balance)) = (req.account_id, req.initial_balance) else {
        return Err(AppError::ValidationError("Request validation failed".into()).into());
    };

    state
        .ledger
        .create_account(account_id, &initial_balance)
        .await?;
    Ok(StatusCode::CREATED)
}

/// Get account endpoint
///
/// GET /api/v1/accounts/{account_id}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}",
    params(("account_id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account found", body = AccountResponse),
        (status = 400, description = "Malformed account id", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<AccountResponse>> {
    let account_id = parse_account_id(&raw_id)?;
    let account = state.ledger.get_account(account_id).await?;
    Ok(Json(account.into()))
}

fn parse_account_id(raw: &str) -> Result<AccountId, ApiError> {
    raw.parse::<AccountId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ApiError(AppError::InvalidAccountId))
}
