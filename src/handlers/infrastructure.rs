use axum::{
    extract::{Query, State},
    response::Json,
};
use common::{ForecastQuery, InfrastructureReport, PlanningAssumptions, Scenario};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};

use crate::handlers::{require_forecast, HandlerError};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Query parameters for the infrastructure view
#[derive(Debug, Default, Deserialize, Serialize, IntoParams, ToSchema)]
pub struct InfrastructureQuery {
    /// conservative, baseline (default) or aggressive
    pub scenario: Option<Scenario>,
}

/// Infrastructure planning view of the stored forecast
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InfrastructureView {
    /// Forecast run the view is derived from
    pub query: ForecastQuery,
    pub assumptions: PlanningAssumptions,
    pub report: InfrastructureReport,
}

/// Get infrastructure requirements
///
/// Peak demand, chargers, grid load, risk and the first charger threshold
/// for the selected scenario, recomputed from the stored forecast.
#[utoipa::path(
    get,
    path = "/api/v1/infrastructure",
    params(InfrastructureQuery),
    responses(
        (status = 200, description = "Infrastructure report", body = InfrastructureView),
        (status = 400, description = "Unknown scenario", body = ErrorResponse),
        (status = 404, description = "No forecast run yet", body = ErrorResponse)
    ),
    tag = "planning"
)]
#[instrument(skip(state))]
pub async fn get_infrastructure(
    State(state): State<AppState>,
    Query(query): Query<InfrastructureQuery>,
) -> Result<Json<ApiResponse<InfrastructureView>>, HandlerError> {
    trace!("Entering get_infrastructure function");

    let snapshot = require_forecast(&state).await?;
    let scenario = query.scenario.unwrap_or_default();
    debug!("Computing infrastructure report for scenario {}", scenario);

    let report = state.planner.infrastructure(&snapshot.series, scenario);
    info!(
        "Infrastructure report: scenario={}, chargers={}, risk={}",
        scenario, report.metrics.chargers_needed, report.metrics.risk_tier
    );

    let view = InfrastructureView {
        query: snapshot.query.clone(),
        assumptions: state.planner.estimator().assumptions().clone(),
        report,
    };
    Ok(Json(ApiResponse::ok(
        view,
        "Infrastructure report computed successfully",
    )))
}
