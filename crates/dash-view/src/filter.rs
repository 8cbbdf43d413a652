//! Filter state controller and derived view engine.

use dash_core::{Catalog, Dataset, Record};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq)]
struct Selection {
    catalog: Catalog,
    value: String,
}

/// Current selection for a fixed set of dimensions.
///
/// One instance per filter scope. Only [`FilterState::set`] mutates it; the
/// derive functions borrow it immutably.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterState {
    wildcard: String,
    selections: BTreeMap<String, Selection>,
}

impl FilterState {
    pub fn new(wildcard: impl Into<String>) -> Self {
        Self {
            wildcard: wildcard.into(),
            selections: BTreeMap::new(),
        }
    }

    /// Register a dimension with its catalog and starting selection.
    pub fn with_dimension(
        mut self,
        name: impl Into<String>,
        catalog: Catalog,
        initial: impl Into<String>,
    ) -> Self {
        self.selections.insert(
            name.into(),
            Selection {
                catalog,
                value: initial.into(),
            },
        );
        self
    }

    pub fn wildcard(&self) -> &str {
        &self.wildcard
    }

    pub fn get(&self, dimension: &str) -> Option<&str> {
        self.selections.get(dimension).map(|s| s.value.as_str())
    }

    /// Replace the selection for one dimension, leaving the others untouched.
    ///
    /// Values outside the catalog are stored as given and match no rows.
    /// Unknown dimensions are ignored.
    pub fn set(&mut self, dimension: &str, value: impl Into<String>) {
        let value = value.into();
        let wildcard = self.wildcard.as_str();
        let Some(sel) = self.selections.get_mut(dimension) else {
            warn!(dimension, value = %value, "selection for unknown dimension ignored");
            return;
        };
        if !sel.catalog.admits(&value, wildcard) {
            warn!(dimension, value = %value, "selection outside catalog matches no rows");
        }
        debug!(dimension, from = %sel.value, to = %value, "filter selection changed");
        sel.value = value;
    }

    pub fn is_wildcard(&self, dimension: &str) -> bool {
        self.get(dimension) == Some(self.wildcard.as_str())
    }

    /// Whether the current selection for `dimension` is a catalog member or
    /// the wildcard.
    pub fn admits_selection(&self, dimension: &str) -> bool {
        self.selections
            .get(dimension)
            .is_some_and(|s| s.catalog.admits(&s.value, &self.wildcard))
    }

    /// Selectable values for `dimension`, wildcard first.
    pub fn options(&self, dimension: &str) -> Vec<&str> {
        self.selections
            .get(dimension)
            .map(|s| s.catalog.options(&self.wildcard))
            .unwrap_or_default()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.selections.keys().map(String::as_str)
    }

    /// First dimension name registered in both states, if any.
    pub fn shared_dimension<'a>(&'a self, other: &FilterState) -> Option<&'a str> {
        self.dimensions()
            .find(|d| other.selections.contains_key(*d))
    }

    /// Set every dimension to the wildcard.
    pub fn reset(&mut self) {
        for sel in self.selections.values_mut() {
            sel.value.clone_from(&self.wildcard);
        }
    }
}

/// How a row field is compared with a dimension's selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchRule {
    /// Case-sensitive string equality.
    Exact,
    /// Row value starts with the selected token.
    Prefix,
    /// Any non-wildcard selection keeps rows whose field contains `token`,
    /// whatever value was selected.
    CurrentPeriod { token: String },
    /// Numeric field sign: `below` keeps negatives, `above` keeps positives.
    Direction { below: String, above: String },
}

/// Binds a filter dimension to the row field it constrains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimensionMatch {
    pub dimension: String,
    pub field: String,
    pub rule: MatchRule,
}

impl DimensionMatch {
    pub fn exact(dimension: &str, field: &str) -> Self {
        Self::with_rule(dimension, field, MatchRule::Exact)
    }

    pub fn prefix(dimension: &str, field: &str) -> Self {
        Self::with_rule(dimension, field, MatchRule::Prefix)
    }

    pub fn current_period(dimension: &str, field: &str, token: &str) -> Self {
        Self::with_rule(
            dimension,
            field,
            MatchRule::CurrentPeriod {
                token: token.to_string(),
            },
        )
    }

    pub fn direction(dimension: &str, field: &str, below: &str, above: &str) -> Self {
        Self::with_rule(
            dimension,
            field,
            MatchRule::Direction {
                below: below.to_string(),
                above: above.to_string(),
            },
        )
    }

    fn with_rule(dimension: &str, field: &str, rule: MatchRule) -> Self {
        Self {
            dimension: dimension.to_string(),
            field: field.to_string(),
            rule,
        }
    }

    /// Whether `row` passes this dimension under `state`.
    ///
    /// Fails closed: a dimension missing from `state`, or a selection outside
    /// its catalog, excludes every row.
    pub fn admits(&self, row: &Record, state: &FilterState) -> bool {
        let Some(selected) = state.get(&self.dimension) else {
            return false;
        };
        if selected == state.wildcard() {
            return true;
        }
        if !state.admits_selection(&self.dimension) {
            return false;
        }
        let value = row.get(&self.field);
        match &self.rule {
            MatchRule::Exact => value.as_text() == Some(selected),
            MatchRule::Prefix => value.as_text().is_some_and(|v| v.starts_with(selected)),
            MatchRule::CurrentPeriod { token } => {
                value.as_text().is_some_and(|v| v.contains(token.as_str()))
            }
            MatchRule::Direction { below, above } => match value.as_number() {
                Some(n) if selected == below => n < 0.0,
                Some(n) if selected == above => n > 0.0,
                _ => false,
            },
        }
    }
}

/// Conjunction of every dimension in `dims`.
pub fn row_matches(row: &Record, state: &FilterState, dims: &[DimensionMatch]) -> bool {
    dims.iter().all(|m| m.admits(row, state))
}

/// Order-preserving subsequence of `rows` passing every dimension in `dims`.
pub fn derive<'a>(
    rows: &'a [Record],
    state: &FilterState,
    dims: &[DimensionMatch],
) -> Vec<&'a Record> {
    rows.iter()
        .filter(|row| row_matches(row, state, dims))
        .collect()
}

/// Like [`derive`] but yields positions into `rows`.
pub fn derive_indices(rows: &[Record], state: &FilterState, dims: &[DimensionMatch]) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, state, dims))
        .map(|(i, _)| i)
        .collect()
}

/// Narrow an existing index selection with a second, independent state.
pub fn refine(
    rows: &[Record],
    indices: &[usize],
    state: &FilterState,
    dims: &[DimensionMatch],
) -> Vec<usize> {
    indices
        .iter()
        .copied()
        .filter(|&i| rows.get(i).is_some_and(|row| row_matches(row, state, dims)))
        .collect()
}

/// Which dimensions constrain which row set for one panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewPlan {
    /// Global-scope dimensions applied to chart rows.
    pub chart: Vec<DimensionMatch>,
    /// Global-scope dimensions applied to table rows.
    pub table: Vec<DimensionMatch>,
    /// Table-scope dimensions applied to table rows after `table`.
    pub table_scope: Vec<DimensionMatch>,
}

/// Filtered chart and table rows, as positions into the dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DerivedView {
    chart: Vec<usize>,
    table: Vec<usize>,
}

impl DerivedView {
    pub fn chart_indices(&self) -> &[usize] {
        &self.chart
    }

    pub fn table_indices(&self) -> &[usize] {
        &self.table
    }

    pub fn chart_rows<'a>(&self, ds: &'a Dataset) -> Vec<&'a Record> {
        self.chart.iter().filter_map(|&i| ds.chart_data.get(i)).collect()
    }

    pub fn table_rows<'a>(&self, ds: &'a Dataset) -> Vec<&'a Record> {
        self.table.iter().filter_map(|&i| ds.table_data.get(i)).collect()
    }
}

/// Recompute the derived view for one panel.
pub fn derive_view(
    ds: &Dataset,
    global: &FilterState,
    table_scope: &FilterState,
    plan: &ViewPlan,
) -> DerivedView {
    let chart = derive_indices(&ds.chart_data, global, &plan.chart);
    let table = derive_indices(&ds.table_data, global, &plan.table);
    let table = refine(&ds.table_data, &table, table_scope, &plan.table_scope);
    debug!(
        chart_rows = chart.len(),
        chart_total = ds.chart_data.len(),
        table_rows = table.len(),
        table_total = ds.table_data.len(),
        "derived view recomputed"
    );
    DerivedView { chart, table }
}
