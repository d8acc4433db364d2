use common::{
    ForecastSeries, GrowthTrend, Insights, InsightsNarrative, InsightsSource,
};
use tracing::debug;

/// Last forecast above `first * STRONG_GROWTH_RATIO` counts as strong growth.
pub const STRONG_GROWTH_RATIO: f64 = 1.2;

pub fn growth_trend(early: f64, late: f64) -> GrowthTrend {
    if late > early * STRONG_GROWTH_RATIO {
        GrowthTrend::StrongUpward
    } else if late > early {
        GrowthTrend::ModerateUpward
    } else {
        GrowthTrend::Stable
    }
}

/// Peak and growth trend of the raw forecast, `None` without forecast months.
pub fn summarize(series: &ForecastSeries) -> Option<Insights> {
    let mut points = series.forecast_points();
    let first = points.next()?;

    let mut peak = first;
    let mut last = first;
    for point in points {
        if point.1 > peak.1 {
            peak = point;
        }
        last = point;
    }

    Some(Insights {
        peak_evs: peak.1,
        peak_month: peak.0.to_string(),
        growth_trend: growth_trend(first.1, last.1),
    })
}

/// Deterministic write-up of the insights for a forecast run.
pub fn narrative(insights: &Insights, county: &str, model: &str, horizon: u32) -> InsightsNarrative {
    let pace = match insights.growth_trend {
        GrowthTrend::Stable => "Demand stays broadly flat across the projection window.",
        _ => "Demand growth remains consistent across the projection window.",
    };

    InsightsNarrative {
        summary: format!(
            "EV demand in {} is projected to follow a {} growth trajectory over the next {} months, with peak demand expected around {}.",
            county, insights.growth_trend, horizon, insights.peak_month
        ),
        observations: vec![
            format!(
                "Peak forecasted EV demand reaches approximately {:.2} vehicles.",
                insights.peak_evs
            ),
            format!(
                "The selected {} model captures county-level demand patterns across the forecasting horizon.",
                model
            ),
            pace.to_string(),
        ],
        recommendations: vec![
            "Align infrastructure expansion ahead of the projected peak period.".to_string(),
            "Use scenario analysis to stress-test aggressive adoption cases.".to_string(),
            "Update planning assumptions as new forecast data becomes available.".to_string(),
        ],
    }
}

/// Insights as answered by the remote service or the local fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightsOutcome {
    Remote(Insights),
    Fallback(Insights),
}

impl InsightsOutcome {
    /// Prefers the remote answer, falling back to the local computation.
    ///
    /// `None` only when neither side produced insights.
    pub fn resolve(local: Option<Insights>, remote: Option<Insights>) -> Option<Self> {
        match remote {
            Some(remote) => Some(InsightsOutcome::Remote(remote)),
            None => {
                debug!("Remote insights unavailable, using local computation");
                local.map(InsightsOutcome::Fallback)
            }
        }
    }

    pub fn source(&self) -> InsightsSource {
        match self {
            InsightsOutcome::Remote(_) => InsightsSource::Remote,
            InsightsOutcome::Fallback(_) => InsightsSource::Local,
        }
    }

    pub fn insights(&self) -> &Insights {
        match self {
            InsightsOutcome::Remote(insights) | InsightsOutcome::Fallback(insights) => insights,
        }
    }

    pub fn into_insights(self) -> Insights {
        match self {
            InsightsOutcome::Remote(insights) | InsightsOutcome::Fallback(insights) => insights,
        }
    }
}
