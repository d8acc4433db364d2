//! Types shared by the compute layer, the dashboard API and the CLI.
//! The transport shapes mirror what the forecasting backend sends and what
//! the dashboard handlers return, so every layer deserializes the same structs.

pub mod csv;
mod forecast;
mod insights;
mod metrics;
mod planning;
mod preferences;

pub use forecast::{
    parse_month, ChartPoint, ForecastMeta, ForecastPoint, ForecastQuery, ForecastSeries,
    SeriesError,
};
pub use insights::{GrowthTrend, Insights, InsightsNarrative, InsightsReport, InsightsSource};
pub use metrics::{MetricKind, MetricsCatalog, ModelMetrics, ModelRanking, RankedModel};
pub use planning::{
    AdjustedPoint, ChargerRequirement, ChargingDemandPoint, DerivedMetrics, InfrastructureReport,
    PlanningAssumptions, RiskTier, Scenario, ScenarioComparison, ScenarioOutcome, ScenarioValues,
    ThresholdEvent,
};
pub use preferences::{Preferences, Theme, SIDEBAR_COLLAPSED_KEY, THEME_KEY};

use serde::{Deserialize, Serialize};

/// Generic API response wrapper returned by every dashboard endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}
