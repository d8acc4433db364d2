use chrono::{DateTime, Utc};
use common::{ForecastMeta, ForecastQuery, ForecastSeries};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use utoipa::ToSchema;

/// The most recent successful forecast and the query that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastSnapshot {
    pub query: ForecastQuery,
    pub series: ForecastSeries,
    pub meta: Option<ForecastMeta>,
    pub received_at: DateTime<Utc>,
}

impl ForecastSnapshot {
    pub fn new(query: ForecastQuery, series: ForecastSeries, meta: Option<ForecastMeta>) -> Self {
        Self {
            query,
            series,
            meta,
            received_at: Utc::now(),
        }
    }
}

/// Holder of the current forecast.
///
/// Starts empty. Snapshots are replaced wholesale and never mutated, so a
/// reader holding an `Arc` keeps a consistent series even while a newer
/// run lands.
#[derive(Debug, Clone, Default)]
pub struct ForecastStore {
    current: Arc<RwLock<Option<Arc<ForecastSnapshot>>>>,
}

impl ForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `snapshot` as the current forecast and returns it.
    pub async fn replace(&self, snapshot: ForecastSnapshot) -> Arc<ForecastSnapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = self.current.write().await;
        debug!(
            "Replacing stored forecast with {} points for {}",
            snapshot.series.len(),
            snapshot.query.county
        );
        *guard = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub async fn current(&self) -> Option<Arc<ForecastSnapshot>> {
        self.current.read().await.clone()
    }
}
