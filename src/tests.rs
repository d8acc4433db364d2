#[cfg(test)]
mod integration_tests {
    use crate::handlers::forecast::RunForecastRequest;
    use crate::handlers::infrastructure::InfrastructureView;
    use crate::handlers::scenarios::ScenarioView;
    use crate::schemas::{ApiResponse, ErrorResponse, HealthResponse};
    use crate::store::ForecastSnapshot;
    use crate::test_utils::test_utils::{reference_forecast, setup_test_server};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use common::csv::from_csv;
    use common::{
        ChartPoint, GrowthTrend, InsightsReport, InsightsSource, MetricKind, MetricsCatalog,
        ModelRanking, Preferences, RiskTier, Scenario, Theme,
    };
    use serde_json::json;
    use std::future::IntoFuture;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn king_request() -> RunForecastRequest {
        RunForecastRequest {
            county: "King".to_string(),
            model_name: "xgboost".to_string(),
            horizon: 36,
        }
    }

    async fn run_king_forecast(server: &TestServer) {
        server
            .post("/api/v1/forecast")
            .json(&king_request())
            .await
            .assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (server, _ctx) = setup_test_server().await;

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.backend, "reachable");
    }

    #[tokio::test]
    async fn test_get_counties_and_models() {
        let (server, _ctx) = setup_test_server().await;

        let counties: ApiResponse<Vec<String>> = server.get("/api/v1/counties").await.json();
        assert!(counties.success);
        assert_eq!(counties.data, vec!["King", "Pierce", "Snohomish"]);

        let models: ApiResponse<Vec<String>> = server.get("/api/v1/models").await.json();
        assert_eq!(models.data.len(), 4);
        assert!(models.data.contains(&"random_forest".to_string()));
    }

    #[tokio::test]
    async fn test_metrics_for_one_model() {
        let (server, _ctx) = setup_test_server().await;

        let response = server
            .get("/api/v1/metrics")
            .add_query_param("model", "prophet")
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<MetricsCatalog> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data["prophet"].mape, 37.02);

        let missing = server
            .get("/api/v1/metrics")
            .add_query_param("model", "arima")
            .await;
        missing.assert_status(StatusCode::NOT_FOUND);
        let error: ErrorResponse = missing.json();
        assert_eq!(error.code, "UNKNOWN_MODEL");
    }

    #[tokio::test]
    async fn test_metrics_ranking() {
        let (server, _ctx) = setup_test_server().await;

        let response = server.get("/api/v1/metrics/ranking").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<ModelRanking> = response.json();
        let ranking = body.data;
        assert_eq!(ranking.metric, MetricKind::Rmse);
        let order: Vec<&str> = ranking.models.iter().map(|m| m.model.as_str()).collect();
        assert_eq!(order, vec!["xgboost", "random_forest", "prophet", "lstm"]);
        assert!(ranking.models[0].best);
        assert!(ranking.models[3].worst);
        assert_eq!(ranking.models[1].label, "RANDOM FOREST");

        let by_mape: ApiResponse<ModelRanking> = server
            .get("/api/v1/metrics/ranking")
            .add_query_param("metric", "MAPE")
            .await
            .json();
        assert_eq!(by_mape.data.metric, MetricKind::Mape);
        assert_eq!(by_mape.data.models[0].model, "xgboost");
    }

    #[tokio::test]
    async fn test_views_without_forecast_return_not_found() {
        let (server, _ctx) = setup_test_server().await;

        for route in [
            "/api/v1/forecast",
            "/api/v1/forecast/chart",
            "/api/v1/forecast/export",
            "/api/v1/infrastructure",
            "/api/v1/scenarios",
            "/api/v1/insights",
        ] {
            let response = server.get(route).await;
            response.assert_status(StatusCode::NOT_FOUND);
            let error: ErrorResponse = response.json();
            assert_eq!(error.code, "NO_FORECAST", "route {}", route);
            assert!(!error.success);
        }
    }

    #[tokio::test]
    async fn test_run_forecast_stores_series() {
        let (server, _ctx) = setup_test_server().await;

        let response = server
            .post("/api/v1/forecast")
            .json(&king_request())
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        assert_eq!(body.data["query"]["county"], "King");
        assert_eq!(body.data["series"].as_array().unwrap().len(), 4);
        assert_eq!(body.data["meta"]["history_points"], 2);

        let current: ApiResponse<serde_json::Value> = server.get("/api/v1/forecast").await.json();
        assert_eq!(current.data["series"], body.data["series"]);
    }

    #[tokio::test]
    async fn test_run_forecast_validates_horizon() {
        let (server, _ctx) = setup_test_server().await;

        for horizon in [3, 61] {
            let response = server
                .post("/api/v1/forecast")
                .json(&RunForecastRequest {
                    horizon,
                    ..king_request()
                })
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_run_forecast_uses_default_horizon() {
        let (server, _ctx) = setup_test_server().await;

        let response = server
            .post("/api/v1/forecast")
            .json(&json!({"county": "King", "model_name": "xgboost"}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["query"]["horizon"], 36);
    }

    #[tokio::test]
    async fn test_malformed_forecast_keeps_previous_one() {
        let (server, ctx) = setup_test_server().await;
        run_king_forecast(&server).await;

        Mock::given(method("POST"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"county": "Pierce"})))
            .with_priority(1)
            .mount(&ctx.backend)
            .await;

        let response = server
            .post("/api/v1/forecast")
            .json(&RunForecastRequest {
                county: "Pierce".to_string(),
                ..king_request()
            })
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);
        let error: ErrorResponse = response.json();
        assert_eq!(error.code, "MALFORMED_RESPONSE");

        let current: ApiResponse<ForecastSnapshot> = server.get("/api/v1/forecast").await.json();
        assert_eq!(current.data.query.county, "King");
    }

    #[tokio::test]
    async fn test_backend_failures_map_to_error_codes() {
        let (server, ctx) = setup_test_server().await;

        Mock::given(method("POST"))
            .and(path("/forecast"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"detail": "No data found for county: Atlantis"})),
            )
            .with_priority(1)
            .mount(&ctx.backend)
            .await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(500))
            .with_priority(1)
            .mount(&ctx.backend)
            .await;

        let rejected = server
            .post("/api/v1/forecast")
            .json(&RunForecastRequest {
                county: "Atlantis".to_string(),
                ..king_request()
            })
            .await;
        rejected.assert_status(StatusCode::BAD_REQUEST);
        let error: ErrorResponse = rejected.json();
        assert_eq!(error.code, "BACKEND_REJECTED");
        assert_eq!(error.error, "No data found for county: Atlantis");

        let failed = server.get("/api/v1/models").await;
        failed.assert_status(StatusCode::BAD_GATEWAY);
        let error: ErrorResponse = failed.json();
        assert_eq!(error.code, "BACKEND_ERROR");
    }

    #[tokio::test]
    async fn test_infrastructure_view_per_scenario() {
        let (server, _ctx) = setup_test_server().await;
        run_king_forecast(&server).await;

        let response = server
            .get("/api/v1/infrastructure")
            .add_query_param("scenario", "aggressive")
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<InfrastructureView> = response.json();
        let view = body.data;
        assert_eq!(view.query.county, "King");
        let metrics = &view.report.metrics;
        assert_eq!(metrics.scenario, Scenario::Aggressive);
        assert!(close(metrics.peak_evs, 180.0));
        assert_eq!(metrics.peak_month.as_deref(), Some("2024-02"));
        assert_eq!(metrics.chargers_needed, 5);
        assert!(close(metrics.grid_load_mw, 0.01375));
        assert_eq!(metrics.risk_tier, RiskTier::Low);
        assert!(close(metrics.delta_pct_vs_baseline, 20.0));

        let event = view.report.threshold_event.unwrap();
        assert_eq!((event.from_chargers, event.to_chargers), (4, 5));
        assert_eq!(event.date, "2024-02");
        assert_eq!(view.report.charging_series.len(), 2);

        let baseline: ApiResponse<InfrastructureView> =
            server.get("/api/v1/infrastructure").await.json();
        assert_eq!(baseline.data.report.metrics.scenario, Scenario::Baseline);
        assert_eq!(baseline.data.report.metrics.delta_pct_vs_baseline, 0.0);
        assert_eq!(baseline.data.report.metrics.chargers_needed, 4);

        server
            .get("/api/v1/infrastructure")
            .add_query_param("scenario", "wild")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_scenario_comparison() {
        let (server, _ctx) = setup_test_server().await;
        run_king_forecast(&server).await;

        let response = server.get("/api/v1/scenarios").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<ScenarioView> = response.json();
        let comparison = body.data.comparison;

        let scenarios: Vec<Scenario> = comparison.outcomes.iter().map(|o| o.scenario).collect();
        assert_eq!(scenarios, Scenario::ALL.to_vec());
        assert!(close(comparison.outcomes[0].peak_evs, 135.0));
        assert!(close(comparison.outcomes[0].delta_pct, -10.0));
        assert_eq!(comparison.outcomes[1].delta_pct, 0.0);
        assert!(close(comparison.outcomes[2].peak_evs, 165.0));
        assert!(close(comparison.outcomes[2].delta_pct, 10.0));
        assert_eq!(comparison.chart.len(), 2);
    }

    #[tokio::test]
    async fn test_chart_band_and_policy_shock() {
        let (server, _ctx) = setup_test_server().await;
        run_king_forecast(&server).await;

        let plain: ApiResponse<Vec<ChartPoint>> = server.get("/api/v1/forecast/chart").await.json();
        let rows = plain.data;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].historical, Some(90.0));
        assert_eq!(rows[0].upper, None);
        assert!(close(rows[2].upper.unwrap(), 100.588));
        assert!(close(rows[2].lower.unwrap(), 99.412));
        assert!(rows.iter().all(|r| r.shocked.is_none()));

        let shocked: ApiResponse<Vec<ChartPoint>> = server
            .get("/api/v1/forecast/chart")
            .add_query_param("policy_shock", "true")
            .add_query_param("shock_start", "2")
            .add_query_param("shock_strength", "0.1")
            .await
            .json();
        let rows = shocked.data;
        assert_eq!(rows[1].shocked, None);
        assert!(close(rows[2].shocked.unwrap(), 110.0));
        assert!(close(rows[3].shocked.unwrap(), 180.0));

        server
            .get("/api/v1/forecast/chart")
            .add_query_param("policy_shock", "true")
            .add_query_param("shock_strength", "-0.5")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    fn counted_forecast_mock(expected: u64) -> Mock {
        Mock::given(method("POST"))
            .and(path("/forecast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reference_forecast())
                    .set_delay(std::time::Duration::from_millis(100)),
            )
            .with_priority(1)
            .expect(expected)
    }

    #[tokio::test]
    async fn test_concurrent_identical_runs_share_one_backend_call() {
        let (server, ctx) = setup_test_server().await;
        counted_forecast_mock(1).mount(&ctx.backend).await;

        let request = king_request();
        let (first, second) = tokio::join!(
            server.post("/api/v1/forecast").json(&request).into_future(),
            server.post("/api/v1/forecast").json(&request).into_future()
        );
        first.assert_status(StatusCode::OK);
        second.assert_status(StatusCode::OK);

        let a: ApiResponse<ForecastSnapshot> = first.json();
        let b: ApiResponse<ForecastSnapshot> = second.json();
        assert_eq!(a.data.series, b.data.series);
        ctx.backend.verify().await;
    }

    #[tokio::test]
    async fn test_repeated_runs_fetch_a_fresh_forecast() {
        let (server, ctx) = setup_test_server().await;
        counted_forecast_mock(2).mount(&ctx.backend).await;

        run_king_forecast(&server).await;
        run_king_forecast(&server).await;

        ctx.backend.verify().await;
    }

    #[tokio::test]
    async fn test_export_csv_download() {
        let (server, _ctx) = setup_test_server().await;
        run_king_forecast(&server).await;

        let response = server.get("/api/v1/forecast/export").await;
        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.header("content-type").to_str().unwrap(),
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.header("content-disposition").to_str().unwrap(),
            "attachment; filename=\"ev_demand_forecast.csv\""
        );

        let body = response.text();
        assert_eq!(
            body,
            "date,historical,forecast\n2023-11,90,\n2023-12,95,\n2024-01,,100\n2024-02,,150"
        );
        let parsed = from_csv(&body).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[3].forecast, Some(150.0));
    }

    #[tokio::test]
    async fn test_insights_fall_back_to_local_summary() {
        let (server, ctx) = setup_test_server().await;
        run_king_forecast(&server).await;

        Mock::given(method("POST"))
            .and(path("/insights"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&ctx.backend)
            .await;

        let response = server.get("/api/v1/insights").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<InsightsReport> = response.json();
        let report = body.data;
        assert_eq!(report.source, InsightsSource::Local);
        assert_eq!(report.insights.peak_evs, 150.0);
        assert_eq!(report.insights.peak_month, "2024-02");
        assert_eq!(report.insights.growth_trend, GrowthTrend::StrongUpward);
        assert_eq!(
            report.narrative.summary,
            "EV demand in King is projected to follow a strong upward growth trajectory over the next 36 months, with peak demand expected around 2024-02."
        );
    }

    #[tokio::test]
    async fn test_insights_prefer_remote_answer() {
        let (server, ctx) = setup_test_server().await;
        run_king_forecast(&server).await;

        Mock::given(method("POST"))
            .and(path("/insights"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "peakEVs": 151.5,
                "peakMonth": "2024-02",
                "growthTrend": "moderate upward"
            })))
            .expect(1)
            .mount(&ctx.backend)
            .await;

        let body: ApiResponse<InsightsReport> = server.get("/api/v1/insights").await.json();
        assert_eq!(body.data.source, InsightsSource::Remote);
        assert_eq!(body.data.insights.peak_evs, 151.5);
        assert_eq!(body.data.insights.growth_trend, GrowthTrend::ModerateUpward);
    }

    #[tokio::test]
    async fn test_preferences_round_trip() {
        let (server, ctx) = setup_test_server().await;

        let initial: ApiResponse<Preferences> = server.get("/api/v1/preferences").await.json();
        assert_eq!(initial.data, Preferences::default());

        let response = server
            .put("/api/v1/preferences")
            .json(&json!({"theme": "dark"}))
            .await;
        response.assert_status(StatusCode::OK);
        let updated: ApiResponse<Preferences> = response.json();
        assert_eq!(updated.data.theme, Theme::Dark);
        assert!(!updated.data.sidebar_collapsed);

        let stored = std::fs::read_to_string(ctx.state.preferences.path()).unwrap();
        assert!(stored.contains("\"theme\": \"dark\""));

        let current: ApiResponse<Preferences> = server.get("/api/v1/preferences").await.json();
        assert_eq!(current.data.theme, Theme::Dark);
    }
}
