//! Health check endpoints for Kubernetes-style liveness and readiness checks.
//!
//! - `/livez` - Basic liveness check (immediate 200, nothing else inspected)
//! - `/healthz` - Reports the provider selected for the request

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use crate::context::ActiveProvider;

/// GET /livez - Basic liveness check.
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Service status and the provider in scope.
pub async fn healthz(ActiveProvider(provider): ActiveProvider) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": provider,
    }))
}
