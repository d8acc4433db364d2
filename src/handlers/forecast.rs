use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use axum_valid::Valid;
use common::csv::{to_csv, EXPORT_FILENAME};
use common::{ChartPoint, ForecastQuery};
use compute::overlay::{chart_points, PolicyShock};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::handlers::{backend_error, error_response, require_forecast, HandlerError};
use crate::helpers::gateway;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::store::ForecastSnapshot;

pub const DEFAULT_HORIZON: u32 = 36;

fn default_horizon() -> u32 {
    DEFAULT_HORIZON
}

/// Request body for running a forecast
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct RunForecastRequest {
    /// County name as listed by `/api/v1/counties`
    #[validate(length(min = 1))]
    pub county: String,
    /// Model identifier as listed by `/api/v1/models`
    #[validate(length(min = 1))]
    pub model_name: String,
    /// Forecast horizon in months (6 to 60, default 36)
    #[serde(default = "default_horizon")]
    #[validate(range(min = 6, max = 60))]
    pub horizon: u32,
}

impl From<RunForecastRequest> for ForecastQuery {
    fn from(request: RunForecastRequest) -> Self {
        Self {
            county: request.county,
            model_name: request.model_name,
            horizon: request.horizon,
        }
    }
}

/// Query parameters for the forecast chart
#[derive(Debug, Default, Deserialize, Serialize, IntoParams, ToSchema, Validate)]
pub struct ChartQuery {
    /// Overlay the policy shock scenario
    #[serde(default)]
    pub policy_shock: bool,
    /// Series index where the shock starts
    pub shock_start: Option<usize>,
    /// Monthly uplift of the shock
    #[validate(range(min = 0.0))]
    pub shock_strength: Option<f64>,
}

/// Run a forecast
///
/// Asks the forecasting backend for a forecast and replaces the stored one
/// on success. A failed run leaves the previous forecast untouched.
#[utoipa::path(
    post,
    path = "/api/v1/forecast",
    request_body = RunForecastRequest,
    responses(
        (status = 200, description = "Forecast stored", body = ForecastSnapshot),
        (status = 400, description = "Invalid input or rejected by the backend", body = ErrorResponse),
        (status = 502, description = "Backend failed or answered malformed data", body = ErrorResponse),
        (status = 504, description = "Backend timed out", body = ErrorResponse)
    ),
    tag = "forecast"
)]
#[instrument(skip(state))]
pub async fn run_forecast(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<RunForecastRequest>>,
) -> Result<Json<ApiResponse<ForecastSnapshot>>, HandlerError> {
    trace!("Entering run_forecast function");
    debug!("Running forecast: {:?}", request);

    let snapshot = gateway::run_forecast(&state, request.into())
        .await
        .map_err(|e| {
            error!("Forecast run failed: {}", e);
            backend_error(&e)
        })?;

    info!(
        "Forecast stored: county={}, model={}, points={}",
        snapshot.query.county,
        snapshot.query.model_name,
        snapshot.series.len()
    );
    Ok(Json(ApiResponse::ok(
        ForecastSnapshot::clone(&snapshot),
        "Forecast generated successfully",
    )))
}

/// Get the current forecast
#[utoipa::path(
    get,
    path = "/api/v1/forecast",
    responses(
        (status = 200, description = "Current forecast", body = ForecastSnapshot),
        (status = 404, description = "No forecast run yet", body = ErrorResponse)
    ),
    tag = "forecast"
)]
#[instrument(skip(state))]
pub async fn get_forecast(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ForecastSnapshot>>, HandlerError> {
    trace!("Entering get_forecast function");

    let snapshot = require_forecast(&state).await?;
    Ok(Json(ApiResponse::ok(
        ForecastSnapshot::clone(&snapshot),
        "Forecast retrieved successfully",
    )))
}

/// Get forecast chart rows
///
/// Every point of the stored series with the confidence band and, when
/// `policy_shock` is set, the shocked forecast.
#[utoipa::path(
    get,
    path = "/api/v1/forecast/chart",
    params(ChartQuery),
    responses(
        (status = 200, description = "Chart rows", body = Vec<ChartPoint>),
        (status = 400, description = "Invalid shock parameters", body = ErrorResponse),
        (status = 404, description = "No forecast run yet", body = ErrorResponse)
    ),
    tag = "forecast"
)]
#[instrument(skip(state))]
pub async fn get_forecast_chart(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ChartQuery>>,
) -> Result<Json<ApiResponse<Vec<ChartPoint>>>, HandlerError> {
    trace!("Entering get_forecast_chart function");

    let snapshot = require_forecast(&state).await?;
    let shock = if query.policy_shock {
        let defaults = state.chart.shock;
        let shock = match (query.shock_start, query.shock_strength) {
            (None, None) => defaults,
            (start, strength) => PolicyShock::new(
                start.unwrap_or(defaults.start()),
                strength.unwrap_or(defaults.strength()),
            )
            .map_err(|e| {
                error!("Invalid policy shock: {}", e);
                error_response(StatusCode::BAD_REQUEST, "INVALID_PARAMETER", e.to_string())
            })?,
        };
        Some(shock)
    } else {
        None
    };
    debug!("Chart overlay shock: {:?}", shock);

    let points = chart_points(&snapshot.series, &state.chart.band, shock.as_ref());
    info!("Built {} chart rows", points.len());
    Ok(Json(ApiResponse::ok(points, "Chart data retrieved successfully")))
}

/// Export the current forecast as CSV
#[utoipa::path(
    get,
    path = "/api/v1/forecast/export",
    responses(
        (status = 200, description = "CSV attachment `ev_demand_forecast.csv`", body = String, content_type = "text/csv"),
        (status = 404, description = "No forecast run yet", body = ErrorResponse),
        (status = 500, description = "CSV rendering failed", body = ErrorResponse)
    ),
    tag = "forecast"
)]
#[instrument(skip(state))]
pub async fn export_forecast(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HandlerError> {
    trace!("Entering export_forecast function");

    let snapshot = require_forecast(&state).await?;
    let body = to_csv(&snapshot.series).map_err(|e| {
        error!("Failed to render forecast CSV: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_ERROR", e.to_string())
    })?;
    info!("Exporting {} forecast rows as CSV", snapshot.series.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        body,
    ))
}
