use axum::{extract::State, response::Json};
use common::{ForecastQuery, ScenarioComparison};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, trace};
use utoipa::ToSchema;

use crate::handlers::{require_forecast, HandlerError};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Scenario comparison of the stored forecast
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScenarioView {
    pub query: ForecastQuery,
    pub comparison: ScenarioComparison,
}

/// Compare adoption scenarios
///
/// Conservative, baseline and aggressive trajectories with their peaks,
/// charger counts, grid load and delta against the baseline. The adoption
/// multipliers change after the policy breakpoint month.
#[utoipa::path(
    get,
    path = "/api/v1/scenarios",
    responses(
        (status = 200, description = "Scenario comparison", body = ScenarioView),
        (status = 404, description = "No forecast run yet", body = ErrorResponse)
    ),
    tag = "planning"
)]
#[instrument(skip(state))]
pub async fn get_scenarios(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ScenarioView>>, HandlerError> {
    trace!("Entering get_scenarios function");

    let snapshot = require_forecast(&state).await?;
    let comparison = state.planner.compare_scenarios(&snapshot.series);
    info!(
        "Compared {} scenarios over {} months",
        comparison.outcomes.len(),
        comparison.chart.len()
    );

    Ok(Json(ApiResponse::ok(
        ScenarioView {
            query: snapshot.query.clone(),
            comparison,
        },
        "Scenarios compared successfully",
    )))
}
