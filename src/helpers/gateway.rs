//! Backend calls shared by the dashboard handlers and the CLI.
//!
//! Identical concurrent requests are coalesced through the state cache:
//! `try_get_with` runs one fetch per key and every waiter gets its result.
//! Failures are not cached. Catalog and metrics answers stay cached for the
//! configured TTL; forecast runs are only shared while in flight.

use common::{ForecastQuery, MetricsCatalog};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

use crate::backend::{BackendError, ForecastRun};
use crate::schemas::{AppState, CachedData};
use crate::store::ForecastSnapshot;

fn forecast_key(query: &ForecastQuery) -> String {
    format!("forecast:{}:{}:{}", query.county, query.model_name, query.horizon)
}

async fn coalesced<F>(state: &AppState, key: String, fetch: F) -> Result<CachedData, BackendError>
where
    F: Future<Output = Result<CachedData, BackendError>>,
{
    trace!("Looking up {} in cache", key);
    state
        .cache
        .try_get_with(key, fetch)
        .await
        .map_err(|e: Arc<BackendError>| (*e).clone())
}

fn unexpected_entry(key: &str) -> BackendError {
    BackendError::Malformed {
        endpoint: key.to_string(),
        reason: "unexpected cache entry".to_string(),
    }
}

pub async fn counties(state: &AppState) -> Result<Vec<String>, BackendError> {
    let backend = Arc::clone(&state.backend);
    match coalesced(state, "counties".to_string(), async move {
        backend.counties().await.map(CachedData::Counties)
    })
    .await?
    {
        CachedData::Counties(counties) => Ok(counties),
        _ => Err(unexpected_entry("counties")),
    }
}

pub async fn models(state: &AppState) -> Result<Vec<String>, BackendError> {
    let backend = Arc::clone(&state.backend);
    match coalesced(state, "models".to_string(), async move {
        backend.models().await.map(CachedData::Models)
    })
    .await?
    {
        CachedData::Models(models) => Ok(models),
        _ => Err(unexpected_entry("models")),
    }
}

pub async fn metrics(state: &AppState) -> Result<MetricsCatalog, BackendError> {
    let backend = Arc::clone(&state.backend);
    match coalesced(state, "metrics".to_string(), async move {
        backend.metrics().await.map(CachedData::Metrics)
    })
    .await?
    {
        CachedData::Metrics(catalog) => Ok(catalog),
        _ => Err(unexpected_entry("metrics")),
    }
}

/// Runs a forecast and installs it in the store.
///
/// The store is only touched on success; a failed or malformed run leaves
/// the previous forecast in place.
#[instrument(skip(state))]
pub async fn run_forecast(
    state: &AppState,
    query: ForecastQuery,
) -> Result<Arc<ForecastSnapshot>, BackendError> {
    let key = forecast_key(&query);
    let backend = Arc::clone(&state.backend);
    let request = query.clone();
    let result = coalesced(state, key.clone(), async move {
        backend.forecast(&request).await.map(CachedData::Forecast)
    })
    .await;
    // A later run for the same query must reach the backend again.
    state.cache.invalidate(&key).await;

    let run = match result? {
        CachedData::Forecast(run) => run,
        _ => return Err(unexpected_entry(&key)),
    };

    let ForecastRun { series, meta } = run;
    debug!("Forecast run returned {} points", series.len());
    let snapshot = state
        .store
        .replace(ForecastSnapshot::new(query, series, meta))
        .await;
    info!("Stored forecast for {}", snapshot.query.county);
    Ok(snapshot)
}
