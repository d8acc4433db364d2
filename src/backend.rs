//! HTTP client for the external forecasting backend.
//!
//! The backend is an opaque data source: it lists counties and models,
//! serves precomputed evaluation metrics, generates forecasts and
//! optionally summarizes them. No call is retried.

use common::{
    ForecastMeta, ForecastPoint, ForecastQuery, ForecastSeries, GrowthTrend, Insights,
    MetricsCatalog,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, trace};

/// Failures talking to the forecasting backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint} answered with HTTP {status}: {detail}")]
    Status {
        endpoint: String,
        status: u16,
        detail: String,
    },

    #[error("malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

/// A forecast as returned by `POST /forecast`, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRun {
    pub series: ForecastSeries,
    pub meta: Option<ForecastMeta>,
}

#[derive(Deserialize)]
struct ForecastEnvelope {
    #[serde(default)]
    forecast: Option<ForecastPayload>,
}

#[derive(Deserialize)]
struct ForecastPayload {
    #[serde(default)]
    series: Option<Vec<ForecastPoint>>,
    #[serde(default)]
    meta: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct InsightsRequestBody<'a> {
    county: &'a str,
    model: &'a str,
    horizon: u32,
    forecast_series: &'a [ForecastPoint],
}

#[derive(Deserialize)]
struct RemoteInsights {
    #[serde(rename = "peakEVs")]
    peak_evs: f64,
    #[serde(rename = "peakMonth")]
    peak_month: String,
    #[serde(rename = "growthTrend")]
    growth_trend: GrowthTrend,
}

#[derive(Deserialize)]
struct ErrorDetail {
    detail: serde_json::Value,
}

fn request_error(endpoint: &str, err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else {
        BackendError::Transport {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }
}

/// FastAPI reports errors as `{"detail": ...}`; anything else is passed through.
fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorDetail>(body) {
        Ok(ErrorDetail {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorDetail { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

async fn read_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| request_error(endpoint, e))?;

    if !status.is_success() {
        return Err(BackendError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            detail: extract_detail(&body),
        });
    }

    trace!("{} - Response received, parsing JSON", endpoint);
    serde_json::from_str(&body).map_err(|e| BackendError::Malformed {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Typed client for the forecasting backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    /// Builds a client whose requests give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;
        Ok(Self::with_client(base_url, http))
    }

    /// Builds a client from an existing reqwest client.
    pub fn with_client(base_url: &str, http: Client) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, BackendError> {
        debug!("GET request to: {}", self.url(endpoint));
        let response = self
            .http
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| {
                error!("GET {} - request failed: {}", endpoint, e);
                request_error(endpoint, e)
            })?;
        read_json(endpoint, response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        debug!("POST request to: {}", self.url(endpoint));
        let response = self
            .http
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("POST {} - request failed: {}", endpoint, e);
                request_error(endpoint, e)
            })?;
        read_json(endpoint, response).await
    }

    /// Checks that the backend answers on its root path.
    pub async fn ping(&self) -> Result<(), BackendError> {
        self.get::<serde_json::Value>("/").await.map(|_| ())
    }

    #[instrument(skip(self))]
    pub async fn counties(&self) -> Result<Vec<String>, BackendError> {
        let counties: Vec<String> = self.get("/counties").await?;
        info!("Fetched {} counties", counties.len());
        Ok(counties)
    }

    #[instrument(skip(self))]
    pub async fn models(&self) -> Result<Vec<String>, BackendError> {
        let models: Vec<String> = self.get("/models").await?;
        info!("Fetched {} models", models.len());
        Ok(models)
    }

    #[instrument(skip(self))]
    pub async fn metrics(&self) -> Result<MetricsCatalog, BackendError> {
        let catalog: MetricsCatalog = self.get("/metrics").await?;
        info!("Fetched metrics for {} models", catalog.len());
        Ok(catalog)
    }

    /// Runs a forecast. A response without `forecast.series`, or whose series
    /// is not chronologically ordered, is malformed.
    #[instrument(skip(self))]
    pub async fn forecast(&self, query: &ForecastQuery) -> Result<ForecastRun, BackendError> {
        const ENDPOINT: &str = "/forecast";

        let envelope: ForecastEnvelope = self.post(ENDPOINT, query).await?;
        let malformed = |reason: String| BackendError::Malformed {
            endpoint: ENDPOINT.to_string(),
            reason,
        };

        let payload = envelope
            .forecast
            .ok_or_else(|| malformed("missing 'forecast' object".to_string()))?;
        let points = payload
            .series
            .ok_or_else(|| malformed("missing 'forecast.series' array".to_string()))?;
        let series = ForecastSeries::new(points).map_err(|e| malformed(e.to_string()))?;
        let meta = payload
            .meta
            .and_then(|value| serde_json::from_value::<ForecastMeta>(value).ok());

        info!(
            "Forecast for {} with {} returned {} points",
            query.county,
            query.model_name,
            series.len()
        );
        Ok(ForecastRun { series, meta })
    }

    /// Asks the backend to summarize a forecast.
    #[instrument(skip(self, query, series), fields(county = %query.county))]
    pub async fn insights(
        &self,
        query: &ForecastQuery,
        series: &ForecastSeries,
    ) -> Result<Insights, BackendError> {
        let body = InsightsRequestBody {
            county: &query.county,
            model: &query.model_name,
            horizon: query.horizon,
            forecast_series: series.points(),
        };
        let remote: RemoteInsights = self.post("/insights", &body).await?;
        Ok(Insights {
            peak_evs: remote.peak_evs,
            peak_month: remote.peak_month,
            growth_trend: remote.growth_trend,
        })
    }
}
