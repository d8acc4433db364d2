use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use common::{MetricKind, MetricsCatalog, ModelRanking};
use compute::ranking::rank_models;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};

use crate::handlers::{backend_error, error_response, HandlerError};
use crate::helpers::gateway;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Query parameters for the metrics endpoint
#[derive(Debug, Deserialize, Serialize, IntoParams, ToSchema)]
pub struct MetricsQuery {
    /// Restrict the answer to one model (e.g. `xgboost`)
    pub model: Option<String>,
}

/// Query parameters for the ranking endpoint
#[derive(Debug, Deserialize, Serialize, IntoParams, ToSchema)]
pub struct RankingQuery {
    /// Metric to rank by: MAE, RMSE (default) or MAPE
    pub metric: Option<MetricKind>,
}

/// List counties
///
/// Counties the forecasting backend has data for.
#[utoipa::path(
    get,
    path = "/api/v1/counties",
    responses(
        (status = 200, description = "County names", body = Vec<String>),
        (status = 502, description = "Forecasting backend failed", body = ErrorResponse)
    ),
    tag = "catalog"
)]
#[instrument(skip(state))]
pub async fn get_counties(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, HandlerError> {
    trace!("Entering get_counties function");

    let counties = gateway::counties(&state).await.map_err(|e| {
        error!("Failed to fetch counties: {}", e);
        backend_error(&e)
    })?;

    info!("Retrieved {} counties", counties.len());
    Ok(Json(ApiResponse::ok(counties, "Counties retrieved successfully")))
}

/// List forecasting models
#[utoipa::path(
    get,
    path = "/api/v1/models",
    responses(
        (status = 200, description = "Model identifiers", body = Vec<String>),
        (status = 502, description = "Forecasting backend failed", body = ErrorResponse)
    ),
    tag = "catalog"
)]
#[instrument(skip(state))]
pub async fn get_models(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, HandlerError> {
    trace!("Entering get_models function");

    let models = gateway::models(&state).await.map_err(|e| {
        error!("Failed to fetch models: {}", e);
        backend_error(&e)
    })?;

    info!("Retrieved {} models", models.len());
    Ok(Json(ApiResponse::ok(models, "Models retrieved successfully")))
}

/// Get model evaluation metrics
///
/// Returns MAE, RMSE and MAPE for every model, or for the one named in `model`.
#[utoipa::path(
    get,
    path = "/api/v1/metrics",
    params(MetricsQuery),
    responses(
        (status = 200, description = "Metrics keyed by model", body = std::collections::BTreeMap<String, common::ModelMetrics>),
        (status = 404, description = "Unknown model", body = ErrorResponse),
        (status = 502, description = "Forecasting backend failed", body = ErrorResponse)
    ),
    tag = "catalog"
)]
#[instrument(skip(state))]
pub async fn get_metrics(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<ApiResponse<MetricsCatalog>>, HandlerError> {
    trace!("Entering get_metrics function");
    debug!("Metrics query: {:?}", query);

    let mut catalog = gateway::metrics(&state).await.map_err(|e| {
        error!("Failed to fetch metrics: {}", e);
        backend_error(&e)
    })?;

    if let Some(model) = query.model {
        let Some(metrics) = catalog.remove(&model) else {
            debug!("No metrics for model {}", model);
            return Err(error_response(
                StatusCode::NOT_FOUND,
                "UNKNOWN_MODEL",
                format!("No metrics available for model '{}'", model),
            ));
        };
        catalog = MetricsCatalog::from([(model, metrics)]);
    }

    info!("Retrieved metrics for {} models", catalog.len());
    Ok(Json(ApiResponse::ok(catalog, "Metrics retrieved successfully")))
}

/// Rank models by a metric
///
/// Lowest error first; the first model is flagged best and the last worst.
#[utoipa::path(
    get,
    path = "/api/v1/metrics/ranking",
    params(RankingQuery),
    responses(
        (status = 200, description = "Models ordered by the metric", body = ModelRanking),
        (status = 502, description = "Forecasting backend failed", body = ErrorResponse)
    ),
    tag = "catalog"
)]
#[instrument(skip(state))]
pub async fn get_metrics_ranking(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<ModelRanking>>, HandlerError> {
    trace!("Entering get_metrics_ranking function");

    let catalog = gateway::metrics(&state).await.map_err(|e| {
        error!("Failed to fetch metrics: {}", e);
        backend_error(&e)
    })?;

    let ranking = rank_models(&catalog, query.metric.unwrap_or_default());
    info!("Ranked {} models by {}", ranking.models.len(), ranking.metric);
    Ok(Json(ApiResponse::ok(ranking, "Models ranked successfully")))
}
