use common::{
    AdjustedPoint, ChargerRequirement, ChargingDemandPoint, ChartPoint, DerivedMetrics,
    ForecastMeta, ForecastPoint, ForecastQuery, ForecastSeries, GrowthTrend, Insights,
    InsightsNarrative, InsightsReport, InsightsSource, InfrastructureReport, MetricKind,
    MetricsCatalog, ModelMetrics, ModelRanking, Preferences, RankedModel, RiskTier, Scenario,
    ScenarioComparison, ScenarioOutcome, ScenarioValues, Theme, ThresholdEvent,
};
use compute::overlay::{ConfidenceBand, PolicyShock};
use compute::Planner;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::{OpenApi, ToSchema};

use crate::backend::{BackendClient, ForecastRun};
use crate::preferences::{PreferenceStore, PreferencesUpdate};
use crate::store::{ForecastSnapshot, ForecastStore};

pub use common::ApiResponse;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Forecasting backend client
    pub backend: Arc<BackendClient>,
    /// Coalesces and briefly keeps backend answers
    pub cache: Cache<String, CachedData>,
    /// Most recent forecast
    pub store: ForecastStore,
    pub planner: Arc<Planner>,
    pub chart: ChartDefaults,
    pub preferences: PreferenceStore,
    /// Upper bound for handling one HTTP request
    pub request_timeout: Duration,
}

/// Cached backend answers
#[derive(Clone, Debug)]
pub enum CachedData {
    Counties(Vec<String>),
    Models(Vec<String>),
    Metrics(MetricsCatalog),
    Forecast(ForecastRun),
}

/// Chart overlay parameters used when a request does not override them.
#[derive(Clone, Copy, Debug)]
pub struct ChartDefaults {
    pub band: ConfidenceBand,
    pub shock: PolicyShock,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Forecasting backend status
    pub backend: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::catalog::get_counties,
        crate::handlers::catalog::get_models,
        crate::handlers::catalog::get_metrics,
        crate::handlers::catalog::get_metrics_ranking,
        crate::handlers::forecast::run_forecast,
        crate::handlers::forecast::get_forecast,
        crate::handlers::forecast::get_forecast_chart,
        crate::handlers::forecast::export_forecast,
        crate::handlers::infrastructure::get_infrastructure,
        crate::handlers::scenarios::get_scenarios,
        crate::handlers::insights::get_insights,
        crate::handlers::preferences::get_preferences,
        crate::handlers::preferences::update_preferences,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            crate::handlers::forecast::RunForecastRequest,
            crate::handlers::infrastructure::InfrastructureView,
            crate::handlers::scenarios::ScenarioView,
            ForecastSnapshot,
            ForecastSeries,
            ForecastPoint,
            ForecastQuery,
            ForecastMeta,
            ChartPoint,
            ModelMetrics,
            MetricKind,
            ModelRanking,
            RankedModel,
            Scenario,
            RiskTier,
            DerivedMetrics,
            ThresholdEvent,
            ChargerRequirement,
            ChargingDemandPoint,
            ScenarioValues,
            AdjustedPoint,
            ScenarioOutcome,
            ScenarioComparison,
            InfrastructureReport,
            GrowthTrend,
            Insights,
            InsightsNarrative,
            InsightsSource,
            InsightsReport,
            Preferences,
            PreferencesUpdate,
            Theme,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Counties, models and evaluation metrics"),
        (name = "forecast", description = "Forecast runs, chart overlays and CSV export"),
        (name = "planning", description = "Infrastructure and scenario planning views"),
        (name = "insights", description = "Forecast insights"),
        (name = "preferences", description = "Dashboard display preferences"),
    ),
    info(
        title = "EV Demand Planning API",
        description = "Scenario, infrastructure and insight views over EV demand forecasts",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
