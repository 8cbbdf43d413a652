#![deny(warnings)]

//! Filter–derive–render pipeline shared by every dashboard panel.
//!
//! - [`filter`]: per-dimension selection state and the derived view engine
//! - [`chart`]: filtered rows to labelled per-metric series
//! - [`table`]: column/renderer contract for tabular output
//! - [`format`]: number formatting used by KPI cards and cell renderers
//!
//! Everything here is synchronous and pure apart from `tracing` events; the
//! dataset is only ever borrowed.

pub mod chart;
pub mod filter;
pub mod format;
pub mod table;

pub use chart::{
    metric_color, metric_label, to_series, ChartData, ChartKind, ChartSeries, ChartSpec,
    LabelFormat, MetricSeries, DEFAULT_METRIC_COLOR,
};
pub use filter::{
    derive, derive_indices, derive_view, refine, row_matches, DerivedView, DimensionMatch,
    FilterState, MatchRule, ViewPlan,
};
pub use format::{fixed, group_thousands, percent, usd, usd_cents};
pub use table::{headers, render_row, render_rows, Cell, CellRenderer, Renderers};
