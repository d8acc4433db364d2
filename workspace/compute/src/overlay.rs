//! Chart overlays derived from the forecast: a confidence band around the
//! forecast and an optional policy shock trajectory.

use common::{ChartPoint, ForecastSeries};

use crate::error::{ComputeError, Result};

/// Residual standard deviation used for the band, in EVs.
pub const DEFAULT_RESIDUAL_STD: f64 = 0.3;
/// z-score of a two-sided 95% interval.
pub const Z_95: f64 = 1.96;
/// Series index at which the policy shock starts by default.
pub const DEFAULT_SHOCK_START: usize = 6;
/// Default cumulative monthly uplift of the policy shock.
pub const DEFAULT_SHOCK_STRENGTH: f64 = 0.04;

/// Symmetric band of `z * sigma` around every forecast value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceBand {
    sigma: f64,
    z: f64,
}

impl Default for ConfidenceBand {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_RESIDUAL_STD,
            z: Z_95,
        }
    }
}

impl ConfidenceBand {
    pub fn new(sigma: f64, z: f64) -> Result<Self> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(ComputeError::InvalidOverlay(format!(
                "residual standard deviation must be non-negative, got {}",
                sigma
            )));
        }
        if !z.is_finite() || z <= 0.0 {
            return Err(ComputeError::InvalidOverlay(format!(
                "z-score must be positive, got {}",
                z
            )));
        }
        Ok(Self { sigma, z })
    }

    /// `(lower, upper)` around `forecast`; the lower bound never drops below zero.
    pub fn bounds(&self, forecast: f64) -> (f64, f64) {
        let half_width = self.z * self.sigma;
        ((forecast - half_width).max(0.0), forecast + half_width)
    }
}

/// Cumulative uplift applied from a start index onwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyShock {
    start: usize,
    strength: f64,
}

impl Default for PolicyShock {
    fn default() -> Self {
        Self {
            start: DEFAULT_SHOCK_START,
            strength: DEFAULT_SHOCK_STRENGTH,
        }
    }
}

impl PolicyShock {
    pub fn new(start: usize, strength: f64) -> Result<Self> {
        if !strength.is_finite() || strength < 0.0 {
            return Err(ComputeError::InvalidOverlay(format!(
                "shock strength must be non-negative, got {}",
                strength
            )));
        }
        Ok(Self { start, strength })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Multiplier at series index `index`, `None` before the shock starts.
    pub fn multiplier_at(&self, index: usize) -> Option<f64> {
        if index < self.start {
            return None;
        }
        let months_after_shock = (index - self.start + 1) as f64;
        Some(1.0 + self.strength * months_after_shock)
    }
}

/// Chart rows for the whole series.
///
/// Indices for the shock count every point of the series, history included.
/// Band and shock are only set on points that carry a forecast.
pub fn chart_points(
    series: &ForecastSeries,
    band: &ConfidenceBand,
    shock: Option<&PolicyShock>,
) -> Vec<ChartPoint> {
    series
        .points()
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let bounds = point.forecast.map(|f| band.bounds(f));
            let shocked = match (point.forecast, shock) {
                (Some(forecast), Some(shock)) => shock.multiplier_at(index).map(|m| forecast * m),
                _ => None,
            };
            ChartPoint {
                date: point.date.clone(),
                historical: point.historical,
                forecast: point.forecast,
                upper: bounds.map(|(_, upper)| upper),
                lower: bounds.map(|(lower, _)| lower),
                shocked,
            }
        })
        .collect()
}
