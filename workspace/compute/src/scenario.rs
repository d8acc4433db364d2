//! Scenario transforms over a forecast series.
//!
//! Only forecast-bearing points take part; the month index handed to a
//! [`Multiplier`] counts forecast months from zero and ignores history.

use common::{
    AdjustedPoint, DerivedMetrics, ForecastSeries, Scenario, ScenarioComparison, ScenarioOutcome,
    ScenarioValues,
};
use tracing::{debug, instrument};

use crate::infrastructure::Estimator;
use crate::multiplier::{Multiplier, ScenarioProfile};

/// Scales every forecast month by the multiplier for its index.
pub fn apply(series: &ForecastSeries, multiplier: Multiplier) -> Vec<AdjustedPoint> {
    series
        .forecast_points()
        .enumerate()
        .map(|(index, (date, forecast))| AdjustedPoint {
            date: date.to_string(),
            forecast,
            value: forecast * multiplier.at(index),
        })
        .collect()
}

/// Point with the highest adjusted value; the earliest one wins ties.
pub fn peak(adjusted: &[AdjustedPoint]) -> Option<&AdjustedPoint> {
    let mut points = adjusted.iter();
    let first = points.next()?;
    Some(points.fold(first, |max, cur| if cur.value > max.value { cur } else { max }))
}

/// Highest raw forecast value of the series.
pub fn baseline_peak(series: &ForecastSeries) -> Option<f64> {
    let adjusted = apply(series, Multiplier::Constant(1.0));
    peak(&adjusted).map(|p| p.value)
}

/// Percentage difference between a scenario peak and the baseline peak.
///
/// Zero for the baseline itself and whenever the baseline peak is zero.
pub fn delta_pct(scenario: Scenario, peak_evs: f64, baseline_peak: f64) -> f64 {
    if scenario == Scenario::Baseline || baseline_peak == 0.0 {
        return 0.0;
    }
    (peak_evs - baseline_peak) / baseline_peak * 100.0
}

/// Derived planning metrics of one scenario.
///
/// A series without forecast months yields the neutral result: no peak,
/// no chargers, zero load, Low risk.
#[instrument(skip(series, profile, estimator), fields(points = series.len()))]
pub fn evaluate(
    series: &ForecastSeries,
    scenario: Scenario,
    profile: &ScenarioProfile,
    estimator: &Estimator,
) -> DerivedMetrics {
    let adjusted = apply(series, profile.multiplier(scenario));
    let Some(peak_point) = peak(&adjusted) else {
        debug!("No forecast months, returning neutral metrics");
        return DerivedMetrics {
            scenario,
            ..DerivedMetrics::default()
        };
    };

    let estimate = estimator.estimate(peak_point.value);
    let baseline = baseline_peak(series).unwrap_or_default();

    DerivedMetrics {
        scenario,
        peak_evs: peak_point.value,
        peak_month: Some(peak_point.date.clone()),
        chargers_needed: estimate.chargers_needed,
        grid_load_mw: estimate.grid_load_mw,
        risk_tier: estimator.risk_tier(estimate.grid_load_mw),
        delta_pct_vs_baseline: delta_pct(scenario, peak_point.value, baseline),
    }
}

/// Compares all scenarios of `profile` side by side.
///
/// Empty when the series has no forecast months.
#[instrument(skip(series, profile, estimator), fields(points = series.len()))]
pub fn compare(
    series: &ForecastSeries,
    profile: &ScenarioProfile,
    estimator: &Estimator,
) -> ScenarioComparison {
    let Some(baseline) = baseline_peak(series) else {
        return ScenarioComparison {
            outcomes: Vec::new(),
            chart: Vec::new(),
        };
    };

    let outcomes: Vec<ScenarioOutcome> = Scenario::ALL
        .iter()
        .map(|&scenario| {
            let adjusted = apply(series, profile.multiplier(scenario));
            let (peak_evs, peak_month) = peak(&adjusted)
                .map(|p| (p.value, Some(p.date.clone())))
                .unwrap_or((0.0, None));
            let estimate = estimator.estimate(peak_evs);

            ScenarioOutcome {
                scenario,
                peak_evs,
                peak_month,
                chargers: estimate.chargers_needed,
                grid_load_mw: estimate.grid_load_mw,
                delta_pct: delta_pct(scenario, peak_evs, baseline),
                series: adjusted,
            }
        })
        .collect();

    let chart = merge_by_date(&outcomes);
    debug!("Compared {} scenarios over {} months", outcomes.len(), chart.len());

    ScenarioComparison { outcomes, chart }
}

fn merge_by_date(outcomes: &[ScenarioOutcome]) -> Vec<ScenarioValues> {
    let value_of = |scenario: Scenario, index: usize| {
        outcomes
            .iter()
            .find(|o| o.scenario == scenario)
            .and_then(|o| o.series.get(index))
            .map(|p| p.value)
            .unwrap_or_default()
    };

    let Some(reference) = outcomes.first() else {
        return Vec::new();
    };

    reference
        .series
        .iter()
        .enumerate()
        .map(|(index, point)| ScenarioValues {
            date: point.date.clone(),
            conservative: value_of(Scenario::Conservative, index),
            baseline: value_of(Scenario::Baseline, index),
            aggressive: value_of(Scenario::Aggressive, index),
        })
        .collect()
}
