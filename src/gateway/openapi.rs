//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::gateway::types::{
    AccountResponse, ComponentHealth, CreateAccountRequest, CreateTransactionRequest, ErrorBody,
    ErrorResponse, HealthResponse, TransactionResponse,
};
use crate::transfer::TransferStatus;

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Internal Transfers API",
        version = "1.0.0",
        description = "Accounts and atomic internal transfers between them. Amounts are decimal strings with up to 5 fractional digits.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::account::create_account,
        crate::gateway::handlers::account::get_account,
        crate::gateway::handlers::transfer::create_transaction,
        crate::gateway::handlers::transfer::get_transaction,
    ),
    components(
        schemas(
            CreateAccountRequest,
            CreateTransactionRequest,
            AccountResponse,
            TransactionResponse,
            TransferStatus,
            ErrorResponse,
            ErrorBody,
            HealthResponse,
            ComponentHealth,
        )
    ),
    tags(
        (name = "Accounts", description = "Account creation and balance lookup"),
        (name = "Transactions", description = "Transfers between accounts"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Internal Transfers API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("Internal Transfers API"));
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths;
        for path in [
            "/api/v1/health",
            "/api/v1/accounts",
            "/api/v1/accounts/{account_id}",
            "/api/v1/transactions",
            "/api/v1/transactions/{transaction_id}",
        ] {
            assert!(paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_balance_format_documented() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("70.00000"));
        assert!(json.contains("always 5 fractional digits"));
    }

    #[test]
    fn test_error_schema_registered() {
        let components = ApiDoc::openapi().components.expect("should have components");
        assert!(components.schemas.contains_key("ErrorResponse"));
        assert!(components.schemas.contains_key("TransferStatus"));
    }
}
