//! Tabular renderer contract: columns, rows and per-field overrides.

use dash_core::{Column, Record, Tone, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Display value for one table cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Cell {
    /// The row's field value, verbatim.
    Raw(Value),
    /// Text produced by a custom renderer.
    Text(String),
    /// A labelled badge with a tone and an optional icon name.
    Chip {
        label: String,
        tone: Tone,
        icon: Option<String>,
    },
}

impl Cell {
    pub fn chip(label: impl Into<String>, tone: Tone) -> Self {
        Cell::Chip {
            label: label.into(),
            tone,
            icon: None,
        }
    }

    pub fn chip_with_icon(label: impl Into<String>, tone: Tone, icon: &str) -> Self {
        Cell::Chip {
            label: label.into(),
            tone,
            icon: Some(icon.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Raw(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Chip { label, .. } => write!(f, "[{label}]"),
        }
    }
}

/// Formats one field; receives the field value and the whole row.
pub type CellRenderer = Box<dyn Fn(&Value, &Record) -> Cell + Send + Sync>;

/// Field name -> custom renderer. Fields without an entry render raw.
#[derive(Default)]
pub struct Renderers {
    by_field: BTreeMap<String, CellRenderer>,
}

impl Renderers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, field: &str, render: F) -> Self
    where
        F: Fn(&Value, &Record) -> Cell + Send + Sync + 'static,
    {
        self.by_field.insert(field.to_string(), Box::new(render));
        self
    }

    pub fn get(&self, field: &str) -> Option<&CellRenderer> {
        self.by_field.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.by_field.keys().map(String::as_str)
    }
}

impl fmt::Debug for Renderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.fields()).finish()
    }
}

/// Header text per column, in column order.
pub fn headers(columns: &[Column]) -> Vec<&str> {
    columns.iter().map(|c| c.header_name.as_str()).collect()
}

/// One display value per column, in column order.
pub fn render_row(row: &Record, columns: &[Column], renderers: &Renderers) -> Vec<Cell> {
    columns
        .iter()
        .map(|c| {
            let value = row.get(&c.field);
            match renderers.get(&c.field) {
                Some(render) => render(value, row),
                None => Cell::Raw(value.clone()),
            }
        })
        .collect()
}

pub fn render_rows(rows: &[&Record], columns: &[Column], renderers: &Renderers) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|row| render_row(row, columns, renderers))
        .collect()
}
