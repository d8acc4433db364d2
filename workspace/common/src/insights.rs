use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Shape of demand growth between the first and last forecast month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum GrowthTrend {
    #[serde(rename = "strong upward")]
    StrongUpward,
    #[serde(rename = "moderate upward")]
    ModerateUpward,
    #[serde(rename = "stable")]
    Stable,
}

impl GrowthTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthTrend::StrongUpward => "strong upward",
            GrowthTrend::ModerateUpward => "moderate upward",
            GrowthTrend::Stable => "stable",
        }
    }
}

impl fmt::Display for GrowthTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline numbers of a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Insights {
    pub peak_evs: f64,
    pub peak_month: String,
    pub growth_trend: GrowthTrend,
}

/// Plain-language write-up built from [`Insights`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InsightsNarrative {
    pub summary: String,
    pub observations: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Where the insights shown to the user came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InsightsSource {
    /// The backend insights service answered
    Remote,
    /// Computed locally after the remote call failed or returned nothing
    Local,
}

/// Insights view payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InsightsReport {
    pub source: InsightsSource,
    pub insights: Insights,
    pub narrative: InsightsNarrative,
}
