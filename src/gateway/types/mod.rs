//! Gateway types module
//!
//! ## Input Types
//! - [`ValidatedJson`]: Axum extractor that binds and validates a JSON body
//! - [`CreateAccountRequest`], [`CreateTransactionRequest`]
//!
//! ## Output Types
//! - [`ApiError`]: error envelope `{"error": {"code", "message"}}`
//! - [`AccountResponse`], [`TransactionResponse`], [`HealthResponse`]

pub mod request;
pub mod response;

pub use request::{CreateAccountRequest, CreateTransactionRequest, ValidatedJson};
pub use response::{
    AccountResponse, ApiError, ApiResult, ComponentHealth, ErrorBody, ErrorResponse,
    HealthResponse, TransactionResponse,
};
