use anyhow::{Context, Result};
use common::csv::to_csv;
use common::ForecastQuery;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, trace};

use super::render;
use crate::config::{initialize_app_state, Settings};
use crate::helpers::gateway;
use crate::schemas::AppState;
use crate::store::ForecastSnapshot;

/// Runs the forecast every report command starts from.
pub(crate) async fn fetch(state: &AppState, query: ForecastQuery) -> Result<Arc<ForecastSnapshot>> {
    info!(
        "Running forecast: county={}, model={}, horizon={}",
        query.county, query.model_name, query.horizon
    );
    gateway::run_forecast(state, query).await.map_err(|e| {
        error!("Forecast failed: {}", e);
        anyhow::Error::new(e).context("Forecast failed")
    })
}

pub async fn forecast(settings: &Settings, query: ForecastQuery, export: Option<&Path>) -> Result<()> {
    trace!("Entering forecast function");
    let state = initialize_app_state(settings).await?;
    let snapshot = fetch(&state, query).await?;

    println!("{}\n", render::heading("EV demand forecast", &snapshot.query));
    println!("{}", render::forecast_table(&snapshot.series));

    if let Some(path) = export {
        let csv = to_csv(&snapshot.series).context("Failed to render forecast as CSV")?;
        std::fs::write(path, csv).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Exported {} rows to {}", snapshot.series.len(), path.display());
        println!("\nExported forecast to {}", path.display());
    }
    Ok(())
}
