//! Health check handler

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use tracing::{debug, error};

use super::super::state::AppState;
use super::super::types::{ComponentHealth, HealthResponse};

pub const SERVICE_NAME: &str = "internal-transfers";

/// Health check endpoint
///
/// Pings the storage backend on every call.
///
/// - Healthy: 200 OK + `{status: "healthy", ...}`
/// - Degraded: 503 Service Unavailable + `{status: "degraded", ...}`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Storage unreachable", body = HealthResponse, content_type = "application/json")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let database = match state.ledger.health().await {
        Ok(()) => ComponentHealth {
            status: "healthy".to_string(),
            message: None,
            duration_ms: started.elapsed().as_millis() as u64,
        },
        Err(e) => {
            error!(error = %e, "[HEALTH] storage ping failed");
            ComponentHealth {
                status: "unhealthy".to_string(),
                message: Some("connection failed".to_string()),
                duration_ms: started.elapsed().as_millis() as u64,
            }
        }
    };

    let healthy = database.status == "healthy";
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        service_name: SERVICE_NAME.to_string(),
        version: state.version.clone(),
        timestamp_ms: Utc::now().timestamp_millis(),
        checks: BTreeMap::from([("database".to_string(), database)]),
    };
    debug!(status = %response.status, "health check completed");

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
