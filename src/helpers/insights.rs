use common::InsightsReport;
use compute::insights::{narrative, summarize, InsightsOutcome};
use tracing::{debug, instrument, warn};

use crate::schemas::AppState;
use crate::store::ForecastSnapshot;

/// Insights for the stored forecast, remote answer first.
///
/// The local summary is computed before the backend is asked; any remote
/// failure is logged and replaced by it. `None` only when the series has no
/// forecast months and the backend has nothing to say either.
#[instrument(skip(state, snapshot), fields(county = %snapshot.query.county))]
pub async fn resolve_insights(state: &AppState, snapshot: &ForecastSnapshot) -> Option<InsightsReport> {
    let local = summarize(&snapshot.series);
    debug!("Local insights: {:?}", local);

    let remote = match state.backend.insights(&snapshot.query, &snapshot.series).await {
        Ok(insights) => Some(insights),
        Err(e) => {
            warn!("Remote insights unavailable, falling back to local summary: {}", e);
            None
        }
    };

    let outcome = InsightsOutcome::resolve(local, remote)?;
    let source = outcome.source();
    let insights = outcome.into_insights();
    let narrative = narrative(
        &insights,
        &snapshot.query.county,
        &snapshot.query.model_name,
        snapshot.query.horizon,
    );

    Some(InsightsReport {
        source,
        insights,
        narrative,
    })
}
