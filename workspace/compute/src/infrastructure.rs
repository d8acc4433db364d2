use common::{
    ChargerRequirement, ChargingDemandPoint, ForecastSeries, InfrastructureReport,
    PlanningAssumptions, RiskTier, Scenario, ScenarioValues,
};
use tracing::{instrument, trace, warn};

use crate::error::{ComputeError, Result};
use crate::multiplier::{Multiplier, ScenarioProfile};
use crate::{scenario, threshold};

/// Charger count and grid load needed for a given EV demand.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Estimate {
    pub chargers_needed: u64,
    pub grid_load_mw: f64,
}

/// Converts EV demand into charger counts, grid load and risk.
///
/// Every estimate is a pure function of the input and the
/// [`PlanningAssumptions`] the estimator was built with.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimator {
    assumptions: PlanningAssumptions,
}

impl Default for Estimator {
    fn default() -> Self {
        Self {
            assumptions: PlanningAssumptions::default(),
        }
    }
}

fn check(ok: bool, message: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(ComputeError::InvalidAssumption(message.to_string()))
    }
}

/// Negative, NaN and infinite values count as no demand.
fn clamp_demand(value: f64, what: &str) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        if value != 0.0 {
            warn!("Clamping invalid {} {} to zero", what, value);
        }
        0.0
    }
}

impl Estimator {
    /// Builds an estimator after validating the assumptions.
    pub fn new(assumptions: PlanningAssumptions) -> Result<Self> {
        let a = &assumptions;
        check(
            a.sessions_per_ev_per_month.is_finite() && a.sessions_per_ev_per_month >= 0.0,
            "sessions_per_ev_per_month must be a non-negative number",
        )?;
        check(
            a.sessions_per_charger_per_month.is_finite() && a.sessions_per_charger_per_month > 0.0,
            "sessions_per_charger_per_month must be positive",
        )?;
        check(
            a.avg_charger_power_kw.is_finite() && a.avg_charger_power_kw >= 0.0,
            "avg_charger_power_kw must be a non-negative number",
        )?;
        check(
            (0.0..=1.0).contains(&a.concurrency_factor),
            "concurrency_factor must be between 0 and 1",
        )?;
        check(
            a.low_risk_threshold_mw.is_finite() && a.low_risk_threshold_mw >= 0.0,
            "low_risk_threshold_mw must be a non-negative number",
        )?;
        check(
            a.medium_risk_threshold_mw.is_finite()
                && a.medium_risk_threshold_mw >= a.low_risk_threshold_mw,
            "medium_risk_threshold_mw must not be below low_risk_threshold_mw",
        )?;

        Ok(Self { assumptions })
    }

    pub fn assumptions(&self) -> &PlanningAssumptions {
        &self.assumptions
    }

    /// Monthly charging sessions generated by `evs` vehicles.
    pub fn monthly_sessions(&self, evs: f64) -> f64 {
        clamp_demand(evs, "EV count") * self.assumptions.sessions_per_ev_per_month
    }

    /// Chargers needed to serve `sessions` monthly sessions, rounded up.
    ///
    /// Demand too large for `f64` saturates at `u64::MAX`.
    pub fn chargers_for_sessions(&self, sessions: f64) -> u64 {
        if sessions.is_nan() || sessions <= 0.0 {
            return 0;
        }
        if sessions.is_infinite() {
            return u64::MAX;
        }
        (sessions / self.assumptions.sessions_per_charger_per_month).ceil() as u64
    }

    /// Peak concurrent load of `chargers` chargers in MW.
    pub fn grid_load_mw(&self, chargers: u64) -> f64 {
        chargers as f64 * self.assumptions.avg_charger_power_kw * self.assumptions.concurrency_factor
            / 1000.0
    }

    pub fn risk_tier(&self, grid_load_mw: f64) -> RiskTier {
        if grid_load_mw > self.assumptions.medium_risk_threshold_mw {
            RiskTier::High
        } else if grid_load_mw > self.assumptions.low_risk_threshold_mw {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    /// Chargers and grid load for a peak EV count.
    ///
    /// Invalid input (negative, NaN, infinite) is clamped to zero, which
    /// yields zero chargers and zero load.
    pub fn estimate(&self, peak_evs: f64) -> Estimate {
        let chargers_needed = self.chargers_for_sessions(self.monthly_sessions(peak_evs));
        Estimate {
            chargers_needed,
            grid_load_mw: self.grid_load_mw(chargers_needed),
        }
    }

    /// Monthly sessions per forecast month, baseline against `multiplier`.
    pub fn charging_series(
        &self,
        series: &ForecastSeries,
        multiplier: Multiplier,
    ) -> Vec<ChargingDemandPoint> {
        series
            .forecast_points()
            .enumerate()
            .map(|(index, (date, forecast))| {
                let baseline = self.monthly_sessions(forecast);
                ChargingDemandPoint {
                    date: date.to_string(),
                    baseline,
                    scenario: baseline * multiplier.at(index),
                }
            })
            .collect()
    }

    /// Chargers required each month for the scenario sessions.
    pub fn charger_timeline(&self, charging: &[ChargingDemandPoint]) -> Vec<ChargerRequirement> {
        charging
            .iter()
            .map(|point| ChargerRequirement {
                date: point.date.clone(),
                chargers: self.chargers_for_sessions(point.scenario),
            })
            .collect()
    }

    /// Monthly sessions under every scenario of `profile`.
    pub fn sessions_comparison(
        &self,
        series: &ForecastSeries,
        profile: &ScenarioProfile,
    ) -> Vec<ScenarioValues> {
        let conservative = profile.multiplier(Scenario::Conservative);
        let aggressive = profile.multiplier(Scenario::Aggressive);
        series
            .forecast_points()
            .enumerate()
            .map(|(index, (date, forecast))| {
                let baseline = self.monthly_sessions(forecast);
                ScenarioValues {
                    date: date.to_string(),
                    conservative: baseline * conservative.at(index),
                    baseline,
                    aggressive: baseline * aggressive.at(index),
                }
            })
            .collect()
    }

    /// Full infrastructure view for one scenario.
    #[instrument(skip(self, series, profile), fields(points = series.len()))]
    pub fn report(
        &self,
        series: &ForecastSeries,
        selected: Scenario,
        profile: &ScenarioProfile,
    ) -> InfrastructureReport {
        let metrics = scenario::evaluate(series, selected, profile, self);
        let charging_series = self.charging_series(series, profile.multiplier(selected));
        let charger_timeline = self.charger_timeline(&charging_series);
        let threshold_event = threshold::first_increase(&charger_timeline);
        trace!(?threshold_event, "Infrastructure report computed");

        InfrastructureReport {
            metrics,
            charging_series,
            charger_timeline,
            threshold_event,
            sessions_comparison: self.sessions_comparison(series, profile),
        }
    }
}
