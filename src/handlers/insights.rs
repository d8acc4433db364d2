use axum::{extract::State, http::StatusCode, response::Json};
use common::InsightsReport;
use tracing::{info, instrument, trace, warn};

use crate::handlers::{error_response, require_forecast, HandlerError};
use crate::helpers::insights::resolve_insights;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Get forecast insights
///
/// Peak demand, peak month and growth trend with a written summary. The
/// backend insights service is asked first; when it fails the insights are
/// computed locally and `source` is `local`.
#[utoipa::path(
    get,
    path = "/api/v1/insights",
    responses(
        (status = 200, description = "Insights for the stored forecast", body = InsightsReport),
        (status = 404, description = "No forecast, or a forecast without forecast months", body = ErrorResponse)
    ),
    tag = "insights"
)]
#[instrument(skip(state))]
pub async fn get_insights(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<InsightsReport>>, HandlerError> {
    trace!("Entering get_insights function");

    let snapshot = require_forecast(&state).await?;
    let report = resolve_insights(&state, &snapshot).await.ok_or_else(|| {
        warn!("Stored forecast has no forecast months to summarize");
        error_response(
            StatusCode::NOT_FOUND,
            "NO_FORECAST_DATA",
            "The stored forecast has no forecast months",
        )
    })?;

    info!("Insights resolved from {:?} source", report.source);
    Ok(Json(ApiResponse::ok(report, "Insights generated successfully")))
}
