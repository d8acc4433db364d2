use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// EV adoption scenario applied on top of a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Conservative,
    #[default]
    Baseline,
    Aggressive,
}

impl Scenario {
    /// All scenarios in display order.
    pub const ALL: [Scenario; 3] = [
        Scenario::Conservative,
        Scenario::Baseline,
        Scenario::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Conservative => "conservative",
            Scenario::Baseline => "baseline",
            Scenario::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Scenario::Conservative),
            "baseline" => Ok(Scenario::Baseline),
            "aggressive" => Ok(Scenario::Aggressive),
            other => Err(format!("unknown scenario '{}'", other)),
        }
    }
}

/// Grid impact classification of an estimated load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum RiskTier {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        };
        f.write_str(label)
    }
}

/// Infrastructure planning constants.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PlanningAssumptions {
    pub sessions_per_ev_per_month: f64,
    pub sessions_per_charger_per_month: f64,
    pub avg_charger_power_kw: f64,
    /// Share of chargers drawing power at the same time
    pub concurrency_factor: f64,
    /// Loads above this are at least Medium risk
    pub low_risk_threshold_mw: f64,
    /// Loads above this are High risk
    pub medium_risk_threshold_mw: f64,
}

impl Default for PlanningAssumptions {
    fn default() -> Self {
        Self {
            sessions_per_ev_per_month: 8.0,
            sessions_per_charger_per_month: 300.0,
            avg_charger_power_kw: 11.0,
            concurrency_factor: 0.25,
            low_risk_threshold_mw: 2.0,
            medium_risk_threshold_mw: 5.0,
        }
    }
}

/// Planning quantities derived from a forecast under one scenario.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct DerivedMetrics {
    pub scenario: Scenario,
    pub peak_evs: f64,
    /// Month of the peak, absent when the series has no forecast
    pub peak_month: Option<String>,
    pub chargers_needed: u64,
    pub grid_load_mw: f64,
    pub risk_tier: RiskTier,
    pub delta_pct_vs_baseline: f64,
}

/// First month where the required charger count goes up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ThresholdEvent {
    pub from_chargers: u64,
    pub to_chargers: u64,
    pub date: String,
}

/// Chargers required in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChargerRequirement {
    pub date: String,
    pub chargers: u64,
}

/// Monthly charging sessions, baseline against the selected scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChargingDemandPoint {
    pub date: String,
    pub baseline: f64,
    pub scenario: f64,
}

/// One value per scenario for a given month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScenarioValues {
    pub date: String,
    pub conservative: f64,
    pub baseline: f64,
    pub aggressive: f64,
}

/// A forecast month after the scenario multiplier was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdjustedPoint {
    pub date: String,
    pub forecast: f64,
    pub value: f64,
}

/// Row of the scenario comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub peak_evs: f64,
    pub peak_month: Option<String>,
    pub chargers: u64,
    pub grid_load_mw: f64,
    pub delta_pct: f64,
    pub series: Vec<AdjustedPoint>,
}

/// Side-by-side comparison of all scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScenarioComparison {
    pub outcomes: Vec<ScenarioOutcome>,
    /// Adjusted demand merged by month for charting
    pub chart: Vec<ScenarioValues>,
}

/// Everything the infrastructure view shows for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InfrastructureReport {
    pub metrics: DerivedMetrics,
    pub charging_series: Vec<ChargingDemandPoint>,
    pub charger_timeline: Vec<ChargerRequirement>,
    pub threshold_event: Option<ThresholdEvent>,
    /// Monthly sessions under every scenario
    pub sessions_comparison: Vec<ScenarioValues>,
}
