//! CSV export of a forecast series.
//!
//! The format is a fixed three-column table, `date,historical,forecast`,
//! one line per point, with absent values written as empty fields.

use crate::forecast::{ForecastPoint, ForecastSeries};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use thiserror::Error;

/// Column names of the export, in order.
pub const CSV_HEADER: [&str; 3] = ["date", "historical", "forecast"];

/// File name offered for the download.
pub const EXPORT_FILENAME: &str = "ev_demand_forecast.csv";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CsvError {
    #[error("missing header line")]
    MissingHeader,

    #[error("unexpected header '{0}'")]
    UnexpectedHeader(String),

    #[error("line {line}: expected 3 fields, found {found}")]
    FieldCount { line: u64, found: usize },

    #[error("line {line}: invalid number '{value}'")]
    InvalidNumber { line: u64, value: String },

    #[error("malformed CSV: {0}")]
    Malformed(String),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::UnequalLengths { pos, len, .. } => CsvError::FieldCount {
                line: pos.as_ref().map(|p| p.line()).unwrap_or_default(),
                found: *len as usize,
            },
            _ => CsvError::Malformed(err.to_string()),
        }
    }
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_value(field: &str, line: u64) -> Result<Option<f64>, CsvError> {
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse::<f64>()
        .map(Some)
        .map_err(|_| CsvError::InvalidNumber {
            line,
            value: field.to_string(),
        })
}

fn write_points(points: &[ForecastPoint]) -> Result<String, CsvError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for point in points {
        writer.write_record([
            point.date.clone(),
            format_value(point.historical),
            format_value(point.forecast),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Malformed(e.to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|e| CsvError::Malformed(e.to_string()))?;
    // Lines are joined with `\n`; the last record has no terminator.
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Renders the series as CSV text. Lines are separated by `\n` with no
/// trailing newline.
pub fn to_csv(series: &ForecastSeries) -> Result<String, CsvError> {
    write_points(series.points())
}

/// Parses text produced by [`to_csv`] back into points.
pub fn from_csv(text: &str) -> Result<Vec<ForecastPoint>, CsvError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(CsvError::MissingHeader);
    }
    if headers != StringRecord::from(CSV_HEADER.to_vec()) {
        return Err(CsvError::UnexpectedHeader(headers.iter().collect::<Vec<_>>().join(",")));
    }

    let mut points = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        points.push(ForecastPoint {
            date: record[0].to_string(),
            historical: parse_value(&record[1], line)?,
            forecast: parse_value(&record[2], line)?,
        });
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ForecastSeries {
        ForecastSeries::new(vec![
            ForecastPoint::historical("2023-12", 42.0),
            ForecastPoint {
                date: "2024-01".to_string(),
                historical: Some(44.0),
                forecast: Some(44.5),
            },
            ForecastPoint::forecast("2024-02", 47.25),
        ])
        .unwrap()
    }

    #[test]
    fn test_export_writes_empty_fields_for_absent_values() {
        let csv = to_csv(&sample()).unwrap();
        assert_eq!(
            csv,
            "date,historical,forecast\n2023-12,42,\n2024-01,44,44.5\n2024-02,,47.25"
        );
    }

    #[test]
    fn test_export_then_parse_keeps_triples() {
        let series = sample();
        let parsed = from_csv(&to_csv(&series).unwrap()).unwrap();
        assert_eq!(parsed, series.points());
    }

    #[test]
    fn test_empty_series_exports_header_only() {
        let csv = to_csv(&ForecastSeries::default()).unwrap();
        assert_eq!(csv, "date,historical,forecast");
        assert!(from_csv(&csv).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(from_csv(""), Err(CsvError::MissingHeader));
        assert!(matches!(
            from_csv("when,what\n"),
            Err(CsvError::UnexpectedHeader(_))
        ));
        assert_eq!(
            from_csv("date,historical,forecast\n2024-01,1"),
            Err(CsvError::FieldCount { line: 2, found: 2 })
        );
        assert!(matches!(
            from_csv("date,historical,forecast\n2024-01,,lots"),
            Err(CsvError::InvalidNumber { line: 2, .. })
        ));
    }

    #[test]
    fn test_labels_with_separators_are_quoted() {
        let points = vec![
            ForecastPoint::historical("2024-01, revised", 12.0),
            ForecastPoint::forecast("2024-02 \"est\"", 13.5),
        ];

        let csv = write_points(&points).unwrap();
        assert_eq!(
            csv,
            "date,historical,forecast\n\"2024-01, revised\",12,\n\"2024-02 \"\"est\"\"\",,13.5"
        );
        assert_eq!(from_csv(&csv).unwrap(), points);
    }

    #[test]
    fn test_parse_accepts_crlf_line_endings() {
        let parsed = from_csv("date,historical,forecast\r\n2024-01,3,\r\n").unwrap();
        assert_eq!(parsed, vec![ForecastPoint::historical("2024-01", 3.0)]);
    }
}
