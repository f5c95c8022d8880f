use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::services::get_metrics;
use crate::startup::AppState;

/// Health check endpoint for liveness probes.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = match &state.db {
        Some(db) => db.health_check().await,
        None => Ok(()),
    };

    match db_status {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "ticketing-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "ticketing-service",
                "error": e.to_string()
            })),
        ),
    }
}

/// Readiness check endpoint.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = match &state.db {
        Some(db) => db.health_check().await,
        None => Ok(()),
    };
    match db_status {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Prometheus metrics endpoint.
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
