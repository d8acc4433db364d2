use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

/// One month of EV demand as returned by the forecasting backend.
///
/// Historical months carry `historical`, forecast months carry `forecast`.
/// A single month at the transition may carry both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastPoint {
    /// Month label (`YYYY-MM`)
    pub date: String,
    /// Observed EV count
    #[serde(default)]
    pub historical: Option<f64>,
    /// Forecasted EV count
    #[serde(default)]
    pub forecast: Option<f64>,
}

impl ForecastPoint {
    pub fn historical(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            historical: Some(value),
            forecast: None,
        }
    }

    pub fn forecast(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            historical: None,
            forecast: Some(value),
        }
    }
}

/// Reasons a list of points cannot form a [`ForecastSeries`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("point {index} has an unparseable month label '{date}'")]
    UnparseableDate { index: usize, date: String },

    #[error("point {index} ('{date}') precedes the previous point ('{previous}')")]
    OutOfOrder {
        index: usize,
        previous: String,
        date: String,
    },

    #[error("point {index} repeats month '{date}'")]
    DuplicateDate { index: usize, date: String },
}

/// Parses a month label into the first day of that month.
///
/// Accepts `YYYY-MM` and full `YYYY-MM-DD` dates.
pub fn parse_month(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", label), "%Y-%m-%d"))
        .ok()
        .and_then(|date| date.with_day(1))
}

/// Chronologically ordered forecast series with unique months.
///
/// The series is immutable once built; a new forecast replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, ToSchema)]
pub struct ForecastSeries(Vec<ForecastPoint>);

impl ForecastSeries {
    /// Validates ordering and builds the series.
    ///
    /// A month that appears twice at the history/forecast transition
    /// (historical-only followed by forecast-only) collapses into one
    /// overlap point. Any other repetition or disorder is rejected.
    pub fn new(points: Vec<ForecastPoint>) -> Result<Self, SeriesError> {
        let mut merged: Vec<ForecastPoint> = Vec::with_capacity(points.len());
        let mut last_month: Option<NaiveDate> = None;

        for (index, point) in points.into_iter().enumerate() {
            let month = parse_month(&point.date).ok_or_else(|| SeriesError::UnparseableDate {
                index,
                date: point.date.clone(),
            })?;

            if let Some(previous_month) = last_month {
                if month < previous_month {
                    let previous = merged
                        .last()
                        .map(|p| p.date.clone())
                        .unwrap_or_default();
                    return Err(SeriesError::OutOfOrder {
                        index,
                        previous,
                        date: point.date,
                    });
                }

                if month == previous_month {
                    match merged.last_mut() {
                        Some(previous)
                            if previous.forecast.is_none()
                                && previous.historical.is_some()
                                && point.historical.is_none()
                                && point.forecast.is_some() =>
                        {
                            debug!("Merging transition month {} into one point", point.date);
                            previous.forecast = point.forecast;
                            continue;
                        }
                        _ => {
                            return Err(SeriesError::DuplicateDate {
                                index,
                                date: point.date,
                            });
                        }
                    }
                }
            }

            last_month = Some(month);
            merged.push(point);
        }

        Ok(Self(merged))
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Forecast-bearing points in order, as `(date, forecast)` pairs.
    pub fn forecast_points(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0
            .iter()
            .filter_map(|p| p.forecast.map(|value| (p.date.as_str(), value)))
    }

    /// Number of points carrying an observed value.
    pub fn history_len(&self) -> usize {
        self.0.iter().filter(|p| p.historical.is_some()).count()
    }
}

impl TryFrom<Vec<ForecastPoint>> for ForecastSeries {
    type Error = SeriesError;

    fn try_from(points: Vec<ForecastPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<ForecastSeries> for Vec<ForecastPoint> {
    fn from(series: ForecastSeries) -> Self {
        series.0
    }
}

impl Serialize for ForecastSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ForecastSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let points = Vec::<ForecastPoint>::deserialize(deserializer)?;
        Self::new(points).map_err(serde::de::Error::custom)
    }
}

/// Parameters of one forecast run, also the backend request body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ForecastQuery {
    /// County name as listed by the backend
    pub county: String,
    /// Model identifier (e.g. `xgboost`)
    pub model_name: String,
    /// Forecast horizon in months
    pub horizon: u32,
}

/// Metadata the backend attaches to a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastMeta {
    pub county: String,
    pub model: String,
    pub horizon: u32,
    pub history_points: usize,
}

/// One row of the forecast chart with its overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartPoint {
    pub date: String,
    pub historical: Option<f64>,
    pub forecast: Option<f64>,
    /// Upper confidence bound, present for forecast months
    pub upper: Option<f64>,
    /// Lower confidence bound, never below zero
    pub lower: Option<f64>,
    /// Forecast under the policy shock, present from the shock start onwards
    pub shocked: Option<f64>,
}
