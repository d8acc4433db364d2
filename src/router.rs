use crate::handlers::{
    catalog::{get_counties, get_metrics, get_metrics_ranking, get_models},
    forecast::{export_forecast, get_forecast, get_forecast_chart, run_forecast},
    health::health_check,
    infrastructure::get_infrastructure,
    insights::get_insights,
    preferences::{get_preferences, update_preferences},
    scenarios::get_scenarios,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Catalog routes
        .route("/api/v1/counties", get(get_counties))
        .route("/api/v1/models", get(get_models))
        .route("/api/v1/metrics", get(get_metrics))
        .route("/api/v1/metrics/ranking", get(get_metrics_ranking))
        // Forecast routes
        .route("/api/v1/forecast", get(get_forecast).post(run_forecast))
        .route("/api/v1/forecast/chart", get(get_forecast_chart))
        .route("/api/v1/forecast/export", get(export_forecast))
        // Planning views
        .route("/api/v1/infrastructure", get(get_infrastructure))
        .route("/api/v1/scenarios", get(get_scenarios))
        .route("/api/v1/insights", get(get_insights))
        // Preferences
        .route(
            "/api/v1/preferences",
            get(get_preferences).put(update_preferences),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
