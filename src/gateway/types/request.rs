//! Request bodies and the validating JSON extractor
//!
//! Fields are `Option` so that a missing field is reported as
//! "`<field>` is required" by the validator instead of a serde error.

use std::borrow::Cow;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use super::response::ApiError;
use crate::error::AppError;

/// Create account request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAccountRequest {
    /// Client-chosen account id
    #[schema(example = 1, minimum = 1)]
    #[validate(
        required(message = "account_id is required"),
        range(min = 1, message = "account_id is too small")
    )]
    pub account_id: Option<i64>,

    /// Starting balance as a decimal string
    #[schema(example = "100.00")]
    #[validate(
        required(message = "initial_balance is required"),
        custom(function = validate_numeric, message = "initial_balance must be numeric")
    )]
    pub initial_balance: Option<String>,
}

/// Create transaction (transfer) request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = validate_distinct_accounts))]
pub struct CreateTransactionRequest {
    #[schema(example = 1, minimum = 1)]
    #[validate(
        required(message = "source_account_id is required"),
        range(min = 1, message = "source_account_id is too small")
    )]
    pub source_account_id: Option<i64>,

    #[schema(example = 2, minimum = 1)]
    #[validate(
        required(message = "destination_account_id is required"),
        range(min = 1, message = "destination_account_id is too small")
    )]
    pub destination_account_id: Option<i64>,

    /// Amount to move as a decimal string
    #[schema(example = "30.00")]
    #[validate(
        required(message = "amount is required"),
        custom(function = validate_numeric, message = "amount must be numeric")
    )]
    pub amount: Option<String>,
}

/// Field names in declaration order; the first failing one is reported.
pub trait FieldOrder {
    const FIELDS: &'static [&'static str];
}

impl FieldOrder for CreateAccountRequest {
    const FIELDS: &'static [&'static str] = &["account_id", "initial_balance"];
}

impl FieldOrder for CreateTransactionRequest {
    const FIELDS: &'static [&'static str] =
        &["source_account_id", "destination_account_id", "amount"];
}

/// Optional sign, digits, optional fraction. Range and precision are checked later.
fn validate_numeric(value: &str) -> Result<(), ValidationError> {
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    let (whole, frac) = match unsigned.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (unsigned, None),
    };

    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if digits(whole) && frac.is_none_or(digits) {
        Ok(())
    } else {
        Err(ValidationError::new("numeric"))
    }
}

fn validate_distinct_accounts(req: &CreateTransactionRequest) -> Result<(), ValidationError> {
    match (req.source_account_id, req.destination_account_id) {
        (Some(source), Some(destination)) if source == destination => {
            Err(ValidationError::new("nefield").with_message(Cow::Borrowed(
                "destination_account_id must be different from source_account_id",
            )))
        }
        _ => Ok(()),
    }
}

/// Message of the first failing field, falling back to struct-level errors.
fn first_message(errors: &ValidationErrors, order: &[&str]) -> String {
    let field_errors = errors.field_errors();

    let first = order
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .chain(field_errors.get("__all__"))
        .find_map(|errs| errs.first());

    match first {
        Some(err) => err
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{} is invalid", err.code)),
        None => "Request validation failed".to_string(),
    }
}

// ============================================================================
// ValidatedJson: Axum Framework Integration
// ============================================================================

/// JSON body that has passed structural validation.
///
/// Malformed JSON or wrong JSON types reject with `INVALID_REQUEST`;
/// validation failures reject with `VALIDATION_ERROR`.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + FieldOrder,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body): Json<T> = Json::from_request(req, state).await.map_err(|e| {
            debug!(error = %e, "Failed to bind request");
            ApiError(AppError::InvalidRequest(e.body_text()))
        })?;

        body.validate().map_err(|errors| {
            debug!(errors = %errors, "Validation failed");
            ApiError(AppError::ValidationError(first_message(&errors, T::FIELDS)))
        })?;

        Ok(ValidatedJson(body))
    }
}
