//! HTTP round trips through the full router on the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use internal_transfers::account::AccountStore;
use internal_transfers::db::{MemoryDb, UnitOfWork};
use internal_transfers::gateway::{build_router, state::AppState};
use internal_transfers::service::{Ledger, LedgerService};

fn app() -> Router {
    app_with(MemoryDb::new(Duration::from_millis(500)), Duration::from_secs(5))
}

fn app_with(db: MemoryDb, request_timeout: Duration) -> Router {
    let ledger: Arc<dyn LedgerService> = Arc::new(Ledger::in_memory(db));
    build_router(Arc::new(AppState::new(ledger, request_timeout)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn send_raw(app: &Router, uri: &str, raw: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(raw.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create_account(app: &Router, id: i64, balance: &str) -> StatusCode {
    let (status, _) = send(
        app,
        "POST",
        "/api/v1/accounts",
        Some(json!({"account_id": id, "initial_balance": balance})),
    )
    .await;
    status
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn test_create_and_get_account() {
    let app = app();
    assert_eq!(create_account(&app, 1, "100.00").await, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/api/v1/accounts/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"account_id": 1, "balance": "100.00000"}));
}

#[tokio::test]
async fn test_create_account_returns_empty_body() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts",
        Some(json!({"account_id": 9, "initial_balance": "0"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_duplicate_account_conflict() {
    let app = app();
    create_account(&app, 1, "10").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts",
        Some(json!({"account_id": 1, "initial_balance": "20"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "ACCOUNT_EXISTS");
}

#[tokio::test]
async fn test_negative_initial_balance() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts",
        Some(json!({"account_id": 1, "initial_balance": "-5.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_BALANCE");

    let (status, _) = send(&app, "GET", "/api/v1/accounts/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_account_validation_errors() {
    let app = app();
    let cases = [
        (json!({"initial_balance": "1"}), "account_id is required"),
        (json!({"account_id": 0, "initial_balance": "1"}), "account_id is too small"),
        (json!({"account_id": 1}), "initial_balance is required"),
        (json!({"account_id": 1, "initial_balance": "ten"}), "initial_balance must be numeric"),
    ];

    for (payload, message) in cases {
        let (status, body) = send(&app, "POST", "/api/v1/accounts", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], message);
    }
}

#[tokio::test]
async fn test_malformed_json_is_invalid_request() {
    let app = app();
    let (status, body) = send_raw(&app, "/api/v1/accounts", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_REQUEST");

    let (status, body) = send_raw(
        &app,
        "/api/v1/transactions",
        r#"{"source_account_id": "one", "destination_account_id": 2, "amount": "1"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_REQUEST");
}

#[tokio::test]
async fn test_bad_account_path_id() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/v1/accounts/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_ACCOUNT_ID");
}

#[tokio::test]
async fn test_transfer_flow() {
    let app = app();
    create_account(&app, 1, "100.00").await;
    create_account(&app, 2, "0.00").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(json!({"source_account_id": 1, "destination_account_id": 2, "amount": "30.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, Value::Null);

    let (_, body) = send(&app, "GET", "/api/v1/accounts/1", None).await;
    assert_eq!(body["balance"], "70.00000");
    let (_, body) = send(&app, "GET", "/api/v1/accounts/2", None).await;
    assert_eq!(body["balance"], "30.00000");

    let (status, body) = send(&app, "GET", "/api/v1/transactions/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["source_account_id"], 1);
    assert_eq!(body["destination_account_id"], 2);
    assert_eq!(body["amount"], "30.00000");
    assert_eq!(body["status"], "completed");
    assert!(body["created_at"].is_string());
    assert!(body["completed_at"].is_string());
}

#[tokio::test]
async fn test_insufficient_balance_records_failure() {
    let app = app();
    create_account(&app, 1, "10").await;
    create_account(&app, 2, "0").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(json!({"source_account_id": 1, "destination_account_id": 2, "amount": "50"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INSUFFICIENT_BALANCE");

    let (_, body) = send(&app, "GET", "/api/v1/transactions/1", None).await;
    assert_eq!(body["status"], "failed");
    assert!(body.get("completed_at").is_none());
}

#[tokio::test]
async fn test_transfer_rejections() {
    let app = app();
    create_account(&app, 1, "10").await;
    create_account(&app, 2, "0").await;

    let cases = [
        (json!({"source_account_id": 1, "destination_account_id": 1, "amount": "1"}), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        (json!({"source_account_id": 1, "destination_account_id": 2, "amount": "abc"}), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        (json!({"source_account_id": 1, "destination_account_id": 2, "amount": "0"}), StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
        (json!({"source_account_id": 1, "destination_account_id": 2, "amount": "1.000001"}), StatusCode::BAD_REQUEST, "INVALID_FORMAT"),
        (json!({"source_account_id": 1, "destination_account_id": 2, "amount": "99999999999999999999999"}), StatusCode::BAD_REQUEST, "BALANCE_OVERFLOW"),
        (json!({"source_account_id": 7, "destination_account_id": 2, "amount": "1"}), StatusCode::NOT_FOUND, "SOURCE_NOT_FOUND"),
        (json!({"source_account_id": 1, "destination_account_id": 7, "amount": "1"}), StatusCode::NOT_FOUND, "DESTINATION_NOT_FOUND"),
    ];

    for (payload, expected_status, expected_code) in cases {
        let (status, body) = send(&app, "POST", "/api/v1/transactions", Some(payload.clone())).await;
        assert_eq!(status, expected_status, "{}", payload);
        assert_eq!(error_code(&body), expected_code, "{}", payload);
    }

    // none of these reached the point of creating a record
    let (status, body) = send(&app, "GET", "/api/v1/transactions/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "TRANSACTION_NOT_FOUND");
}

#[tokio::test]
async fn test_request_timeout_rolls_back_transfer() {
    // lock waits outlast the request deadline
    let db = MemoryDb::new(Duration::from_secs(10));
    let app = app_with(db.clone(), Duration::from_millis(100));
    create_account(&app, 1, "100").await;
    create_account(&app, 2, "0").await;

    let mut holder = db.begin().await.unwrap();
    db.get_for_update(&mut holder, 2).await.unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(json!({"source_account_id": 1, "destination_account_id": 2, "amount": "30"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(&body), "INTERNAL_ERROR");
    assert_eq!(body["error"]["message"], "Internal server error");

    db.rollback(holder).await.unwrap();
    assert_eq!(db.transaction_count().await, 0);

    let (_, body) = send(&app, "GET", "/api/v1/accounts/1", None).await;
    assert_eq!(body["balance"], "100.00000");
    let (_, body) = send(&app, "GET", "/api/v1/accounts/2", None).await;
    assert_eq!(body["balance"], "0.00000");

    // the cancelled unit of work released account 1
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(json!({"source_account_id": 1, "destination_account_id": 2, "amount": "30"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_bad_transaction_path_id() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/v1/transactions/-3", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service_name"], "internal-transfers");
    assert_eq!(body["checks"]["database"]["status"], "healthy");

    let reported = body["timestamp_ms"].as_i64().unwrap();
    let now = chrono::Utc::now().timestamp_millis();
    assert!((now - reported).abs() < 60_000, "timestamp_ms {} vs now {}", reported, now);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/transactions"].is_object());
}
