//! Plain-text rendering of the planning views.

use common::{
    DerivedMetrics, ForecastQuery, ForecastSeries, InfrastructureReport, InsightsReport,
    ModelRanking, ScenarioComparison,
};
use compute::ranking::display_label;
use anyhow::Result;
use std::io::Write;

/// Left-aligned table with a dashed rule under the header.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers.to_vec()));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        out.push('\n');
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

pub fn number(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn optional(value: Option<f64>) -> String {
    value.map(number).unwrap_or_default()
}

/// Signed percentage, e.g. `+20.00%`.
pub fn delta(value: f64) -> String {
    format!("{:+.2}%", value)
}

pub fn heading(title: &str, query: &ForecastQuery) -> String {
    format!(
        "{} for {} using {} ({} months)",
        title,
        query.county,
        display_label(&query.model_name),
        query.horizon
    )
}

pub fn forecast_table(series: &ForecastSeries) -> String {
    let rows: Vec<Vec<String>> = series
        .points()
        .iter()
        .map(|p| vec![p.date.clone(), optional(p.historical), optional(p.forecast)])
        .collect();
    table(&["Month", "Historical", "Forecast"], &rows)
}

pub fn ranking_table(ranking: &ModelRanking) -> String {
    let rows: Vec<Vec<String>> = ranking
        .models
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let flag = match (m.best, m.worst) {
                (true, _) => "best",
                (_, true) => "worst",
                _ => "",
            };
            vec![
                (i + 1).to_string(),
                m.label.clone(),
                number(m.metrics.mae),
                number(m.metrics.rmse),
                number(m.metrics.mape),
                flag.to_string(),
            ]
        })
        .collect();
    table(&["#", "Model", "MAE", "RMSE", "MAPE (%)", ""], &rows)
}

fn metrics_summary(out: &mut impl Write, metrics: &DerivedMetrics) -> Result<()> {
    let peak_month = metrics.peak_month.as_deref().unwrap_or("n/a");
    writeln!(out, "Peak EVs:          {} ({})", number(metrics.peak_evs), peak_month)?;
    writeln!(out, "Chargers needed:   {}", metrics.chargers_needed)?;
    writeln!(out, "Grid load:         {:.3} MW", metrics.grid_load_mw)?;
    writeln!(out, "Grid risk:         {}", metrics.risk_tier)?;
    writeln!(out, "Delta vs baseline: {}", delta(metrics.delta_pct_vs_baseline))?;
    Ok(())
}

pub fn infrastructure(out: &mut impl Write, report: &InfrastructureReport) -> Result<()> {
    metrics_summary(out, &report.metrics)?;
    match &report.threshold_event {
        Some(event) => writeln!(
            out,
            "Threshold:         chargers rise from {} to {} in {}",
            event.from_chargers, event.to_chargers, event.date
        )?,
        None => writeln!(out, "Threshold:         no increase in the horizon")?,
    }
    writeln!(out)?;

    let rows: Vec<Vec<String>> = report
        .charging_series
        .iter()
        .zip(&report.charger_timeline)
        .map(|(sessions, chargers)| {
            vec![
                sessions.date.clone(),
                number(sessions.baseline),
                number(sessions.scenario),
                chargers.chargers.to_string(),
            ]
        })
        .collect();
    writeln!(
        out,
        "{}",
        table(
            &["Month", "Baseline sessions", "Scenario sessions", "Chargers"],
            &rows,
        )
    )?;
    Ok(())
}

pub fn scenarios(comparison: &ScenarioComparison) -> String {
    let rows: Vec<Vec<String>> = comparison
        .outcomes
        .iter()
        .map(|o| {
            vec![
                o.scenario.to_string(),
                number(o.peak_evs),
                o.peak_month.clone().unwrap_or_else(|| "n/a".to_string()),
                o.chargers.to_string(),
                format!("{:.3}", o.grid_load_mw),
                delta(o.delta_pct),
            ]
        })
        .collect();
    table(
        &["Scenario", "Peak EVs", "Peak month", "Chargers", "Grid MW", "vs baseline"],
        &rows,
    )
}

pub fn insights(out: &mut impl Write, report: &InsightsReport) -> Result<()> {
    writeln!(out, "Source:       {:?}", report.source)?;
    writeln!(out, "Peak EVs:     {}", number(report.insights.peak_evs))?;
    writeln!(out, "Peak month:   {}", report.insights.peak_month)?;
    writeln!(out, "Growth trend: {}", report.insights.growth_trend)?;
    writeln!(out, "\n{}", report.narrative.summary)?;
    writeln!(out, "\nKey observations:")?;
    for line in &report.narrative.observations {
        writeln!(out, "  - {}", line)?;
    }
    writeln!(out, "\nPlanning recommendations:")?;
    for line in &report.narrative.recommendations {
        writeln!(out, "  - {}", line)?;
    }
    Ok(())
}
