use axum::{extract::State, response::Json};
use tracing::{instrument, warn};
use crate::schemas::{AppState, HealthResponse};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // The dashboard stays up when the backend is down; report it instead.
    let backend_status = match state.backend.ping().await {
        Ok(_) => "reachable".to_string(),
        Err(e) => {
            warn!("Forecasting backend unreachable: {}", e);
            "unreachable".to_string()
        }
    };

    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: backend_status,
    };

    Json(response)
}
