pub mod catalog;
pub mod forecast;
pub mod health;
pub mod infrastructure;
pub mod insights;
pub mod preferences;
pub mod scenarios;

use axum::{http::StatusCode, response::Json};
use std::sync::Arc;
use tracing::debug;

use crate::backend::BackendError;
use crate::schemas::{AppState, ErrorResponse};
use crate::store::ForecastSnapshot;

pub type HandlerError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, code: &str, error: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }),
    )
}

/// Maps a backend failure onto the status and code the dashboard reports.
pub fn backend_error(err: &BackendError) -> HandlerError {
    match err {
        BackendError::Malformed { .. } => {
            error_response(StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE", err.to_string())
        }
        BackendError::Timeout { .. } => {
            error_response(StatusCode::GATEWAY_TIMEOUT, "BACKEND_TIMEOUT", err.to_string())
        }
        BackendError::Status { status, detail, .. } if (400..500).contains(status) => {
            error_response(StatusCode::BAD_REQUEST, "BACKEND_REJECTED", detail.clone())
        }
        _ => error_response(StatusCode::BAD_GATEWAY, "BACKEND_ERROR", err.to_string()),
    }
}

/// Current forecast, or 404 `NO_FORECAST` while none was run yet.
pub async fn require_forecast(state: &AppState) -> Result<Arc<ForecastSnapshot>, HandlerError> {
    state.store.current().await.ok_or_else(|| {
        debug!("No forecast in store");
        error_response(
            StatusCode::NOT_FOUND,
            "NO_FORECAST",
            "No forecast available. Run a forecast first.",
        )
    })
}
