use axum::{extract::State, http::StatusCode, response::Json};
use common::Preferences;
use tracing::{debug, error, info, instrument, trace};

use crate::handlers::{error_response, HandlerError};
use crate::preferences::PreferencesUpdate;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Get display preferences
#[utoipa::path(
    get,
    path = "/api/v1/preferences",
    responses(
        (status = 200, description = "Current preferences", body = Preferences)
    ),
    tag = "preferences"
)]
#[instrument(skip(state))]
pub async fn get_preferences(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Preferences>>, HandlerError> {
    trace!("Entering get_preferences function");
    let preferences = state.preferences.get().await;
    Ok(Json(ApiResponse::ok(
        preferences,
        "Preferences retrieved successfully",
    )))
}

/// Update display preferences
///
/// Only the fields present in the body change. The result is written to
/// the preferences file before it is returned.
#[utoipa::path(
    put,
    path = "/api/v1/preferences",
    request_body = PreferencesUpdate,
    responses(
        (status = 200, description = "Updated preferences", body = Preferences),
        (status = 500, description = "Preferences could not be saved", body = ErrorResponse)
    ),
    tag = "preferences"
)]
#[instrument(skip(state))]
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(update): Json<PreferencesUpdate>,
) -> Result<Json<ApiResponse<Preferences>>, HandlerError> {
    trace!("Entering update_preferences function");
    debug!("Updating preferences: {:?}", update);

    let preferences = state.preferences.update(update).await.map_err(|e| {
        error!("Failed to save preferences: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "PREFERENCES_ERROR",
            format!("Failed to save preferences: {}", e),
        )
    })?;

    info!("Preferences updated: {:?}", preferences);
    Ok(Json(ApiResponse::ok(
        preferences,
        "Preferences updated successfully",
    )))
}
