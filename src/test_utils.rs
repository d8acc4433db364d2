#[cfg(test)]
pub mod test_utils {
    use crate::config::{initialize_app_state, Settings};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// App state wired to a mock forecasting backend.
    pub struct TestContext {
        pub state: AppState,
        pub backend: MockServer,
        _tracing: tracing::subscriber::DefaultGuard,
        _dir: TempDir,
    }

    /// Forecast the reference backend answers for every query: two months
    /// of history followed by two forecast months.
    pub fn reference_forecast() -> Value {
        json!({
            "county": "King",
            "model": "xgboost",
            "horizon": 36,
            "forecast": {
                "series": [
                    {"date": "2023-11", "historical": 90.0, "forecast": null},
                    {"date": "2023-12", "historical": 95.0, "forecast": null},
                    {"date": "2024-01", "historical": null, "forecast": 100.0},
                    {"date": "2024-02", "historical": null, "forecast": 150.0}
                ],
                "meta": {"county": "King", "model": "xgboost", "horizon": 36, "history_points": 2}
            }
        })
    }

    /// Mounts the catalog, metrics and forecast endpoints on `server`.
    pub async fn mount_reference_backend(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "EV Forecast API running"})))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/counties"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["King", "Pierce", "Snohomish"])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["xgboost", "random_forest", "prophet", "lstm"])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "xgboost": {"MAE": 0.06, "RMSE": 0.30, "MAPE": 1.84},
                "random_forest": {"MAE": 0.06, "RMSE": 0.60, "MAPE": 2.44},
                "prophet": {"MAE": 0.68, "RMSE": 0.76, "MAPE": 37.02},
                "lstm": {"MAE": 1.26, "RMSE": 2.00, "MAPE": 67.30}
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reference_forecast()))
            .mount(server)
            .await;
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create AppState against an empty mock backend
    pub async fn setup_test_context() -> TestContext {
        let tracing = init_test_tracing();
        let backend = MockServer::start().await;
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut settings = Settings::default();
        settings.backend.base_url = backend.uri();
        settings.backend.timeout_secs = 5;
        settings.preferences.path = dir.path().join("preferences.json").display().to_string();

        let state = initialize_app_state(&settings)
            .await
            .expect("Failed to initialize app state");

        TestContext {
            state,
            backend,
            _tracing: tracing,
            _dir: dir,
        }
    }

    /// Create a test server against the reference backend
    pub async fn setup_test_server() -> (TestServer, TestContext) {
        let ctx = setup_test_context().await;
        mount_reference_backend(&ctx.backend).await;
        let server = TestServer::new(create_router(ctx.state.clone()))
            .expect("Failed to create test server");
        (server, ctx)
    }
}
