#![deny(warnings)]

//! Core data model for the finance analytics dashboard.
//!
//! A [`Dataset`] is the immutable bundle backing one panel: filter catalogs,
//! chart rows, table rows, table columns, summary KPIs and insights. This
//! crate defines the serializable shapes and the load-time validation that
//! rejects structurally malformed documents.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Selection value meaning "no constraint on this dimension".
pub const DEFAULT_WILDCARD: &str = "All";

/// A scalar field value as it appears in a dataset document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON `null`, also used for absent fields.
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Text payload, if this is a string value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric payload, if this is a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

static NULL: Value = Value::Null;

/// One row of chart or table data, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Field value; absent fields read as [`Value::Null`].
    pub fn get(&self, field: &str) -> &Value {
        self.0.get(field).unwrap_or(&NULL)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).as_text()
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).as_number()
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Record(iter.into_iter().collect())
    }
}

/// Table column description: the record field and its header text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub field: String,
    pub header_name: String,
}

impl Column {
    pub fn new(field: impl Into<String>, header_name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header_name: header_name.into(),
        }
    }
}

/// Display tone handed to the rendering collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Default,
    Success,
    Warning,
    Info,
    Error,
}

/// Insight severity. The closed set is success/warning/info/error; any other
/// tag in a document lands on `Unmapped` and is shown with the default tone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Info,
    Error,
    #[serde(other)]
    Unmapped,
}

impl Severity {
    pub fn tone(self) -> Tone {
        match self {
            Severity::Success => Tone::Success,
            Severity::Warning => Tone::Warning,
            Severity::Info => Tone::Info,
            Severity::Error => Tone::Error,
            Severity::Unmapped => Tone::Default,
        }
    }
}

/// A severity-tagged message shown next to the panel charts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
}

/// Ordered list of selectable values for one dimension.
///
/// The wildcard is always implicitly selectable; it is only stored when the
/// document lists it explicitly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    values: Vec<String>,
}

impl Catalog {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Options for a selection surface: the wildcard first, then the catalog
    /// in document order without repeating the wildcard.
    pub fn options<'a>(&'a self, wildcard: &'a str) -> Vec<&'a str> {
        std::iter::once(wildcard)
            .chain(
                self.values
                    .iter()
                    .map(String::as_str)
                    .filter(|v| *v != wildcard),
            )
            .collect()
    }

    /// Whether `value` is a legal selection (catalog member or the wildcard).
    pub fn admits(&self, value: &str, wildcard: &str) -> bool {
        value == wildcard || self.values.iter().any(|v| v == value)
    }
}

/// The immutable bundle backing one panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Dimension catalog name -> allowed values.
    pub filters: BTreeMap<String, Catalog>,
    /// Rows feeding the charts.
    pub chart_data: Vec<Record>,
    /// Rows feeding the data table.
    pub table_data: Vec<Record>,
    /// Table shape in display order.
    pub table_columns: Vec<Column>,
    /// KPI name -> precomputed scalar, invariant under filtering.
    pub summary: BTreeMap<String, Value>,
    /// Severity-tagged messages, invariant under filtering.
    pub insights: Vec<Insight>,
}

impl Dataset {
    /// Parse a dataset document. Every top-level field is required.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        serde_json::from_str(json).map_err(|e| DatasetError::Parse(e.to_string()))
    }

    pub fn catalog(&self, name: &str) -> Option<&Catalog> {
        self.filters.get(name)
    }
}

/// Dashboard-wide settings, loaded from YAML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Selection value meaning "match everything".
    pub wildcard: String,
    /// Substring that marks a row's date as belonging to the current period.
    pub current_period_token: String,
    /// chrono format of raw date fields.
    pub date_input_format: String,
    /// chrono format of chart axis labels built from dates.
    pub date_label_format: String,
    /// Panel id opened when none is requested.
    pub default_panel: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            wildcard: DEFAULT_WILDCARD.to_string(),
            current_period_token: "2025-07".to_string(),
            date_input_format: "%Y-%m-%d".to_string(),
            date_label_format: "%b %-d".to_string(),
            default_panel: "player-engagement".to_string(),
        }
    }
}

/// A structurally malformed dataset. Fatal for the panel that loads it.
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    /// A required top-level field is absent or has the wrong shape.
    #[error("malformed dataset document: {0}")]
    Parse(String),
    #[error("table column list is empty")]
    EmptyColumns,
    #[error("duplicate table column: {0}")]
    DuplicateColumn(String),
    #[error("filter catalog not found: {0}")]
    MissingCatalog(String),
    #[error("table row {row} is missing column field `{field}`")]
    MissingColumnField { row: usize, field: String },
    #[error("summary key not found: {0}")]
    MissingSummaryKey(String),
}

/// Invalid dashboard configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("wildcard value must not be empty")]
    EmptyWildcard,
    #[error("current period token must not be empty")]
    EmptyPeriodToken,
    #[error("date format `{0}` must not be empty")]
    EmptyDateFormat(&'static str),
}

/// What a panel expects to find in its dataset beyond the fixed shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DatasetRequirements {
    /// Catalog names the panel's dimensions read from `filters`.
    pub catalogs: Vec<String>,
    /// Summary keys the panel's KPI cards display.
    pub summary_keys: Vec<String>,
    /// Column fields a custom renderer derives, so rows may omit them.
    pub derived_fields: Vec<String>,
}

/// Validate the table column list: non-empty with unique fields.
pub fn validate_columns(columns: &[Column]) -> Result<(), DatasetError> {
    if columns.is_empty() {
        return Err(DatasetError::EmptyColumns);
    }
    let mut seen = BTreeSet::new();
    for c in columns {
        if !seen.insert(c.field.as_str()) {
            return Err(DatasetError::DuplicateColumn(c.field.clone()));
        }
    }
    Ok(())
}

/// Every table row must carry every declared column field, unless the field
/// is derived by a renderer.
pub fn validate_table_rows(
    rows: &[Record],
    columns: &[Column],
    derived_fields: &[String],
) -> Result<(), DatasetError> {
    for (row_idx, row) in rows.iter().enumerate() {
        for c in columns {
            if !row.contains(&c.field) && !derived_fields.contains(&c.field) {
                return Err(DatasetError::MissingColumnField {
                    row: row_idx,
                    field: c.field.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Validate a dataset against a panel's requirements.
///
/// Empty chart or table row sets are legal; panels show a no-data state.
pub fn validate_dataset(ds: &Dataset, req: &DatasetRequirements) -> Result<(), DatasetError> {
    validate_columns(&ds.table_columns)?;
    for name in &req.catalogs {
        if !ds.filters.contains_key(name) {
            return Err(DatasetError::MissingCatalog(name.clone()));
        }
    }
    for key in &req.summary_keys {
        if !ds.summary.contains_key(key) {
            return Err(DatasetError::MissingSummaryKey(key.clone()));
        }
    }
    validate_table_rows(&ds.table_data, &ds.table_columns, &req.derived_fields)?;
    info!(
        chart_rows = ds.chart_data.len(),
        table_rows = ds.table_data.len(),
        columns = ds.table_columns.len(),
        "dataset validated"
    );
    Ok(())
}

/// Validate dashboard configuration fields.
pub fn validate_config(cfg: &DashboardConfig) -> Result<(), ConfigError> {
    if cfg.wildcard.trim().is_empty() {
        return Err(ConfigError::EmptyWildcard);
    }
    if cfg.current_period_token.is_empty() {
        return Err(ConfigError::EmptyPeriodToken);
    }
    if cfg.date_input_format.is_empty() {
        return Err(ConfigError::EmptyDateFormat("date_input_format"));
    }
    if cfg.date_label_format.is_empty() {
        return Err(ConfigError::EmptyDateFormat("date_label_format"));
    }
    Ok(())
}
