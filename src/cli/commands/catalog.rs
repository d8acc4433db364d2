use anyhow::{anyhow, Result};
use common::MetricKind;
use compute::ranking::{display_label, rank_models};
use tracing::{error, info, trace};

use super::render;
use crate::config::{initialize_app_state, Settings};
use crate::helpers::gateway;

pub async fn catalog(settings: &Settings) -> Result<()> {
    trace!("Entering catalog function");
    let state = initialize_app_state(settings).await?;

    let (counties, models) = tokio::try_join!(gateway::counties(&state), gateway::models(&state))
        .map_err(|e| {
            error!("Failed to fetch catalog: {}", e);
            e
        })?;
    info!("Catalog: {} counties, {} models", counties.len(), models.len());

    println!("Counties ({}):", counties.len());
    for county in &counties {
        println!("  {}", county);
    }
    println!("\nModels ({}):", models.len());
    for model in &models {
        println!("  {:<16} {}", model, display_label(model));
    }
    Ok(())
}

pub async fn metrics(settings: &Settings, model: Option<&str>, rank_by: MetricKind) -> Result<()> {
    trace!("Entering metrics function");
    let state = initialize_app_state(settings).await?;

    let catalog = gateway::metrics(&state).await.map_err(|e| {
        error!("Failed to fetch metrics: {}", e);
        e
    })?;

    match model {
        Some(model) => {
            let metrics = catalog
                .get(model)
                .ok_or_else(|| anyhow!("No metrics available for model '{}'", model))?;
            println!("{}", display_label(model));
            println!("  MAE:  {}", render::number(metrics.mae));
            println!("  RMSE: {}", render::number(metrics.rmse));
            println!("  MAPE: {}%", render::number(metrics.mape));
        }
        None => {
            let ranking = rank_models(&catalog, rank_by);
            println!("Models ranked by {} (lower is better)\n", ranking.metric);
            println!("{}", render::ranking_table(&ranking));
        }
    }
    Ok(())
}
