use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Evaluation metrics of one forecasting model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModelMetrics {
    /// Mean Absolute Error
    #[serde(rename = "MAE")]
    pub mae: f64,
    /// Root Mean Squared Error
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    /// Mean Absolute Percentage Error (%)
    #[serde(rename = "MAPE")]
    pub mape: f64,
}

impl ModelMetrics {
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Mae => self.mae,
            MetricKind::Rmse => self.rmse,
            MetricKind::Mape => self.mape,
        }
    }
}

/// Model identifier to its evaluation metrics, as served by `/metrics`.
pub type MetricsCatalog = BTreeMap<String, ModelMetrics>;

/// Metric used to rank models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum MetricKind {
    #[serde(rename = "MAE")]
    Mae,
    #[default]
    #[serde(rename = "RMSE")]
    Rmse,
    #[serde(rename = "MAPE")]
    Mape,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MetricKind::Mae => "MAE",
            MetricKind::Rmse => "RMSE",
            MetricKind::Mape => "MAPE",
        };
        f.write_str(label)
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MAE" => Ok(MetricKind::Mae),
            "RMSE" => Ok(MetricKind::Rmse),
            "MAPE" => Ok(MetricKind::Mape),
            other => Err(format!("unknown metric '{}'", other)),
        }
    }
}

/// A model's position in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RankedModel {
    pub model: String,
    /// Display label, e.g. `RANDOM FOREST`
    pub label: String,
    pub metrics: ModelMetrics,
    pub best: bool,
    pub worst: bool,
}

/// Models ordered from lowest to highest error on one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModelRanking {
    pub metric: MetricKind,
    pub models: Vec<RankedModel>,
}
