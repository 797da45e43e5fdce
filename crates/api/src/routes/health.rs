//! Health check endpoints.
//!
//! Each probe re-checks the store and answers from that result; the global
//! registry is updated for the status report but shared by every router in
//! the process.

use axum::{extract::State, http::StatusCode, Json};
use telemetry::{health, HealthStatus};

use crate::response::HealthResponse;
use crate::state::AppState;

async fn refresh_database(state: &AppState) -> bool {
    let healthy = state.service.is_healthy().await;
    if healthy {
        health().database.set_healthy();
    } else {
        health().database.set_unhealthy("store unreachable");
    }
    healthy
}

/// GET /health - Full health check.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_connected = refresh_database(&state).await;
    let auth_connected = health().auth.is_healthy();
    let status = HealthStatus::from_components(database_connected, auth_connected);

    Json(HealthResponse {
        status: status.as_str().to_string(),
        database_connected,
        auth_connected,
    })
}

/// GET /health/ready - Readiness probe (store reachable).
pub async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    if refresh_database(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe (service is running).
pub async fn live_handler() -> StatusCode {
    StatusCode::OK
}
