//! Chart data transformer.

use chrono::NaiveDate;
use dash_core::{DashboardConfig, Record, Value};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Color used for metrics missing from the color table.
pub const DEFAULT_METRIC_COLOR: &str = "#23411C";

/// Chart primitive requested from the rendering collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// Human-readable legend label; unmapped metrics show their identifier.
pub fn metric_label(metric: &str) -> &str {
    match metric {
        "dau" => "Daily Active Users",
        "adViews" => "Ad Views",
        "xp" => "Experience Points",
        "sessionLength" => "Session Length (min)",
        "rageQuits" => "Rage Quits",
        "actual" => "Actual",
        "budget" => "Budget",
        "forecast" => "Forecast",
        "variance" => "Variance",
        "baseline" => "Baseline",
        "optimistic" => "Optimistic",
        "pessimistic" => "Pessimistic",
        other => other,
    }
}

/// Series color; unmapped metrics get [`DEFAULT_METRIC_COLOR`].
pub fn metric_color(metric: &str) -> &'static str {
    match metric {
        "dau" => "#23411C",
        "adViews" => "#A3C47C",
        "xp" => "#6B8E23",
        "sessionLength" => "#8FBC8F",
        "rageQuits" => "#CD5C5C",
        "actual" => "#23411C",
        "budget" => "#A3C47C",
        "forecast" => "#FFB300",
        "variance" => "#CD5C5C",
        "baseline" => "#23411C",
        "optimistic" => "#6BA368",
        "pessimistic" => "#FFB300",
        _ => DEFAULT_METRIC_COLOR,
    }
}

/// How axis field values become label text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelFormat {
    /// The field's display text, unchanged.
    Raw,
    /// Parse a date with `input` and print it with `output` (chrono formats).
    /// Values that do not parse are shown unchanged.
    Date { input: String, output: String },
}

impl LabelFormat {
    /// Short month/day labels ("Jul 3") using the configured formats.
    pub fn short_date(cfg: &DashboardConfig) -> Self {
        LabelFormat::Date {
            input: cfg.date_input_format.clone(),
            output: cfg.date_label_format.clone(),
        }
    }

    pub fn apply(&self, value: &Value) -> String {
        match self {
            LabelFormat::Raw => value.to_string(),
            LabelFormat::Date { input, output } => match value.as_text() {
                Some(text) => format_date(text, input, output).unwrap_or_else(|| text.to_string()),
                None => value.to_string(),
            },
        }
    }
}

fn format_date(text: &str, input: &str, output: &str) -> Option<String> {
    // Timestamps like "2025-07-03T10:00:00Z" fall back to their date prefix.
    let date = NaiveDate::parse_from_str(text, input).ok().or_else(|| {
        text.get(..10)
            .and_then(|head| NaiveDate::parse_from_str(head, input).ok())
    })?;
    let mut out = String::new();
    write!(out, "{}", date.format(output)).ok()?;
    Some(out)
}

/// One metric's values, aligned with [`ChartSeries::labels`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricSeries {
    pub metric: String,
    pub label: String,
    pub color: String,
    /// `None` where the row has no numeric value for the metric.
    pub values: Vec<Option<f64>>,
}

/// Label axis plus per-metric series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<MetricSeries>,
}

/// Output of the transformer: a series, or the distinct no-data state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ChartData {
    NoData,
    Series(ChartSeries),
}

impl ChartData {
    pub fn series(&self) -> Option<&ChartSeries> {
        match self {
            ChartData::Series(s) => Some(s),
            ChartData::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ChartData::NoData)
    }
}

/// Convert filtered rows into chart-ready series.
///
/// One label per row in row order, no deduplication. Each metric keeps its
/// position in `metrics`.
pub fn to_series<M: AsRef<str>>(
    rows: &[&Record],
    metrics: &[M],
    axis_field: &str,
    format: &LabelFormat,
    color_of: impl Fn(&str) -> &'static str,
) -> ChartData {
    if rows.is_empty() {
        return ChartData::NoData;
    }
    let labels = rows
        .iter()
        .map(|row| format.apply(row.get(axis_field)))
        .collect();
    let datasets = metrics
        .iter()
        .map(|metric| {
            let metric = metric.as_ref();
            MetricSeries {
                metric: metric.to_string(),
                label: metric_label(metric).to_string(),
                color: color_of(metric).to_string(),
                values: rows.iter().map(|row| row.number(metric)).collect(),
            }
        })
        .collect();
    ChartData::Series(ChartSeries { labels, datasets })
}

/// A chart slot on a panel.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub metrics: Vec<String>,
    pub axis_field: String,
    pub labels: LabelFormat,
}

impl ChartSpec {
    pub fn new(
        title: &str,
        kind: ChartKind,
        axis_field: &str,
        labels: LabelFormat,
        metrics: &[&str],
    ) -> Self {
        Self {
            title: title.to_string(),
            kind,
            metrics: metrics.iter().map(|m| m.to_string()).collect(),
            axis_field: axis_field.to_string(),
            labels,
        }
    }

    pub fn build(&self, rows: &[&Record]) -> ChartData {
        to_series(rows, &self.metrics, &self.axis_field, &self.labels, metric_color)
    }
}
