use anyhow::{bail, Result};
use common::{ForecastQuery, Scenario};
use tracing::trace;

use super::forecast::fetch;
use super::render;
use crate::config::{initialize_app_state, Settings};
use crate::helpers::insights::resolve_insights;

pub async fn plan(settings: &Settings, query: ForecastQuery, scenario: Scenario) -> Result<()> {
    trace!("Entering plan function");
    let state = initialize_app_state(settings).await?;
    let snapshot = fetch(&state, query).await?;

    let report = state.planner.infrastructure(&snapshot.series, scenario);
    println!("{}", render::heading("Infrastructure plan", &snapshot.query));
    println!("Scenario: {}\n", scenario);
    render::infrastructure(&mut std::io::stdout().lock(), &report)?;
    Ok(())
}

pub async fn scenarios(settings: &Settings, query: ForecastQuery) -> Result<()> {
    trace!("Entering scenarios function");
    let state = initialize_app_state(settings).await?;
    let snapshot = fetch(&state, query).await?;

    let comparison = state.planner.compare_scenarios(&snapshot.series);
    println!("{}\n", render::heading("Scenario comparison", &snapshot.query));
    if comparison.outcomes.is_empty() {
        println!("The forecast has no forecast months to compare.");
    } else {
        println!("{}", render::scenarios(&comparison));
    }
    Ok(())
}

pub async fn insights(settings: &Settings, query: ForecastQuery) -> Result<()> {
    trace!("Entering insights function");
    let state = initialize_app_state(settings).await?;
    let snapshot = fetch(&state, query).await?;

    let Some(report) = resolve_insights(&state, &snapshot).await else {
        bail!("The forecast has no forecast months to summarize");
    };
    println!("{}\n", render::heading("Forecast insights", &snapshot.query));
    render::insights(&mut std::io::stdout().lock(), &report)?;
    Ok(())
}
