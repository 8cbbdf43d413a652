use crate::panels::PanelId;
use crate::{RenderSink, Scope};
use dash_core::{
    validate_dataset, Catalog, Dataset, DatasetError, DatasetRequirements, Insight, Record, Value,
};
use dash_view::{
    derive_view, group_thousands, headers, render_rows, usd, usd_cents, Cell, ChartData,
    ChartSpec, DerivedView, FilterState, Renderers, ViewPlan,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors building a panel.
#[derive(Debug, Error, PartialEq)]
pub enum PanelError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// The global and table scopes must not share dimension names.
    #[error("dimension `{0}` is declared in both filter scopes")]
    SharedDimension(String),
    #[error("view plan references undeclared dimension `{0}`")]
    UnknownDimension(String),
    #[error("unknown panel: {0}")]
    UnknownPanel(String),
}

/// Where a dimension's catalog comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    /// A key of the dataset's `filters` map.
    Dataset(String),
    /// A fixed list owned by the panel.
    Fixed(Vec<String>),
    /// Leading tokens of a table field (split on whitespace or `-`), unique,
    /// in first-seen order.
    Tokens { field: String },
}

/// Starting selection for a dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Initial {
    Wildcard,
    /// First catalog entry, falling back to the wildcard for empty catalogs.
    First,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimensionSpec {
    pub name: String,
    pub label: String,
    pub source: CatalogSource,
    pub initial: Initial,
}

impl DimensionSpec {
    pub fn from_dataset(name: &str, label: &str, catalog: &str) -> Self {
        Self::new(name, label, CatalogSource::Dataset(catalog.to_string()))
    }

    pub fn fixed(name: &str, label: &str, values: &[&str]) -> Self {
        Self::new(
            name,
            label,
            CatalogSource::Fixed(values.iter().map(|v| v.to_string()).collect()),
        )
    }

    pub fn tokens(name: &str, label: &str, field: &str) -> Self {
        Self::new(
            name,
            label,
            CatalogSource::Tokens {
                field: field.to_string(),
            },
        )
    }

    /// Start at the first catalog entry instead of the wildcard.
    pub fn starting_at_first(mut self) -> Self {
        self.initial = Initial::First;
        self
    }

    fn new(name: &str, label: &str, source: CatalogSource) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            source,
            initial: Initial::Wildcard,
        }
    }

    fn catalog(&self, ds: &Dataset) -> Result<Catalog, DatasetError> {
        match &self.source {
            CatalogSource::Dataset(key) => ds
                .catalog(key)
                .cloned()
                .ok_or_else(|| DatasetError::MissingCatalog(key.clone())),
            CatalogSource::Fixed(values) => Ok(Catalog::new(values.iter().cloned())),
            CatalogSource::Tokens { field } => Ok(leading_tokens(&ds.table_data, field)),
        }
    }
}

fn leading_tokens(rows: &[Record], field: &str) -> Catalog {
    let mut seen = BTreeSet::new();
    let mut tokens = Vec::new();
    for text in rows.iter().filter_map(|r| r.text(field)) {
        let token = text
            .split(|c: char| c.is_whitespace() || c == '-')
            .next()
            .unwrap_or(text);
        if !token.is_empty() && seen.insert(token) {
            tokens.push(token.to_string());
        }
    }
    Catalog::new(tokens)
}

/// Display format for a KPI card value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KpiFormat {
    /// The summary value verbatim.
    Plain,
    /// Thousands separators.
    Grouped,
    /// `$` with thousands separators.
    Usd,
    /// `$` with two decimals.
    UsdCents,
}

impl KpiFormat {
    /// Non-numeric values are always shown verbatim.
    pub fn apply(self, value: &Value) -> String {
        match (self, value.as_number()) {
            (KpiFormat::Grouped, Some(n)) => group_thousands(n),
            (KpiFormat::Usd, Some(n)) => usd(n),
            (KpiFormat::UsdCents, Some(n)) => usd_cents(n),
            _ => value.to_string(),
        }
    }
}

/// Summary card definition: which KPI to show and how.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KpiCard {
    pub title: String,
    pub key: String,
    pub format: KpiFormat,
    pub icon: String,
    pub color: String,
}

impl KpiCard {
    pub fn new(title: &str, key: &str, format: KpiFormat, icon: &str, color: &str) -> Self {
        Self {
            title: title.to_string(),
            key: key.to_string(),
            format,
            icon: icon.to_string(),
            color: color.to_string(),
        }
    }
}

/// A formatted card handed to the rendering collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KpiCardView {
    pub title: String,
    pub value: String,
    pub icon: String,
    pub color: String,
}

/// One dropdown of the selection surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterControl {
    pub dimension: String,
    pub label: String,
    pub selected: String,
    pub options: Vec<String>,
}

/// Everything that distinguishes one panel from another.
#[derive(Debug)]
pub struct PanelSpec {
    pub id: PanelId,
    pub title: String,
    pub wildcard: String,
    /// Global scope, in display order.
    pub dimensions: Vec<DimensionSpec>,
    /// Table scope, in display order.
    pub table_dimensions: Vec<DimensionSpec>,
    pub plan: ViewPlan,
    pub charts: Vec<ChartSpec>,
    pub cards: Vec<KpiCard>,
    pub table_title: String,
    pub renderers: Renderers,
    /// Table columns whose value is computed by a renderer, so rows may omit
    /// them. Every other declared column must be present in every row.
    pub derived: Vec<String>,
}

impl PanelSpec {
    /// Dataset fields this panel reads beyond the fixed document shape.
    pub fn requirements(&self) -> DatasetRequirements {
        let catalogs = self
            .dimensions
            .iter()
            .chain(&self.table_dimensions)
            .filter_map(|d| match &d.source {
                CatalogSource::Dataset(key) => Some(key.clone()),
                _ => None,
            })
            .collect();
        DatasetRequirements {
            catalogs,
            summary_keys: self.cards.iter().map(|c| c.key.clone()).collect(),
            derived_fields: self.derived.clone(),
        }
    }

    fn filter_state(&self, dims: &[DimensionSpec], ds: &Dataset) -> Result<FilterState, DatasetError> {
        let mut state = FilterState::new(self.wildcard.as_str());
        for d in dims {
            let catalog = d.catalog(ds)?;
            let initial = match d.initial {
                Initial::First => catalog.first().unwrap_or(self.wildcard.as_str()).to_string(),
                Initial::Wildcard => self.wildcard.clone(),
            };
            state = state.with_dimension(d.name.as_str(), catalog, initial);
        }
        Ok(state)
    }
}

/// Read-only projections of the dataset, fixed at construction.
#[derive(Clone, Debug, PartialEq)]
struct SummaryView {
    kpis: BTreeMap<String, Value>,
    insights: Vec<Insight>,
    cards: Vec<KpiCardView>,
}

impl SummaryView {
    fn project(ds: &Dataset, cards: &[KpiCard]) -> Self {
        let cards = cards
            .iter()
            .map(|c| KpiCardView {
                title: c.title.clone(),
                value: c.format.apply(ds.summary.get(&c.key).unwrap_or(&Value::Null)),
                icon: c.icon.clone(),
                color: c.color.clone(),
            })
            .collect();
        Self {
            kpis: ds.summary.clone(),
            insights: ds.insights.clone(),
            cards,
        }
    }
}

/// One dashboard panel with its state and derived view.
#[derive(Debug)]
pub struct Panel {
    spec: PanelSpec,
    dataset: Arc<Dataset>,
    global: FilterState,
    table_scope: FilterState,
    view: DerivedView,
    summary: SummaryView,
}

impl Panel {
    /// Validate `dataset` against `spec` and compute the initial view.
    pub fn new(spec: PanelSpec, dataset: Arc<Dataset>) -> Result<Self, PanelError> {
        validate_dataset(&dataset, &spec.requirements())?;
        let global = spec.filter_state(&spec.dimensions, &dataset)?;
        let table_scope = spec.filter_state(&spec.table_dimensions, &dataset)?;
        if let Some(shared) = global.shared_dimension(&table_scope) {
            return Err(PanelError::SharedDimension(shared.to_string()));
        }
        for m in spec.plan.chart.iter().chain(&spec.plan.table) {
            if global.get(&m.dimension).is_none() {
                return Err(PanelError::UnknownDimension(m.dimension.clone()));
            }
        }
        for m in &spec.plan.table_scope {
            if table_scope.get(&m.dimension).is_none() {
                return Err(PanelError::UnknownDimension(m.dimension.clone()));
            }
        }
        let view = derive_view(&dataset, &global, &table_scope, &spec.plan);
        let summary = SummaryView::project(&dataset, &spec.cards);
        info!(
            panel = %spec.id,
            chart_rows = view.chart_indices().len(),
            table_rows = view.table_indices().len(),
            "panel ready"
        );
        Ok(Self {
            spec,
            dataset,
            global,
            table_scope,
            view,
            summary,
        })
    }

    pub fn id(&self) -> PanelId {
        self.spec.id
    }

    pub fn title(&self) -> &str {
        &self.spec.title
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filters(&self, scope: Scope) -> &FilterState {
        match scope {
            Scope::Global => &self.global,
            Scope::Table => &self.table_scope,
        }
    }

    /// Current selection for `dimension` in `scope`.
    pub fn get(&self, scope: Scope, dimension: &str) -> Option<&str> {
        self.filters(scope).get(dimension)
    }

    /// Change one selection and recompute the derived view before returning.
    pub fn select(&mut self, scope: Scope, dimension: &str, value: &str) {
        match scope {
            Scope::Global => self.global.set(dimension, value),
            Scope::Table => self.table_scope.set(dimension, value),
        }
        self.recompute();
    }

    /// Put every dimension of `scope` back on the wildcard.
    pub fn reset(&mut self, scope: Scope) {
        match scope {
            Scope::Global => self.global.reset(),
            Scope::Table => self.table_scope.reset(),
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.view = derive_view(&self.dataset, &self.global, &self.table_scope, &self.spec.plan);
        debug!(panel = %self.spec.id, "view refreshed");
    }

    /// Selection surface for `scope`, in display order.
    pub fn controls(&self, scope: Scope) -> Vec<FilterControl> {
        let (dims, state) = match scope {
            Scope::Global => (&self.spec.dimensions, &self.global),
            Scope::Table => (&self.spec.table_dimensions, &self.table_scope),
        };
        dims.iter()
            .map(|d| FilterControl {
                dimension: d.name.clone(),
                label: d.label.clone(),
                selected: state.get(&d.name).unwrap_or_default().to_string(),
                options: state.options(&d.name).into_iter().map(str::to_string).collect(),
            })
            .collect()
    }

    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    pub fn chart_rows(&self) -> Vec<&Record> {
        self.view.chart_rows(&self.dataset)
    }

    pub fn table_rows(&self) -> Vec<&Record> {
        self.view.table_rows(&self.dataset)
    }

    /// Every chart slot with its series for the current view.
    pub fn charts(&self) -> Vec<(&ChartSpec, ChartData)> {
        let rows = self.chart_rows();
        self.spec
            .charts
            .iter()
            .map(|c| (c, c.build(&rows)))
            .collect()
    }

    pub fn table_headers(&self) -> Vec<&str> {
        headers(&self.dataset.table_columns)
    }

    pub fn table_cells(&self) -> Vec<Vec<Cell>> {
        render_rows(
            &self.table_rows(),
            &self.dataset.table_columns,
            &self.spec.renderers,
        )
    }

    pub fn summary(&self) -> &BTreeMap<String, Value> {
        &self.summary.kpis
    }

    pub fn insights(&self) -> &[Insight] {
        &self.summary.insights
    }

    pub fn cards(&self) -> &[KpiCardView] {
        &self.summary.cards
    }

    /// Hand the whole panel to `sink` in layout order.
    pub fn render(&self, sink: &mut dyn RenderSink) {
        sink.title(&self.spec.title);
        sink.filter_bar(Scope::Global, &self.controls(Scope::Global));
        sink.summary_cards(self.cards());
        sink.insights(self.insights());
        for (spec, data) in self.charts() {
            sink.chart(&spec.title, spec.kind, &data);
        }
        if !self.spec.table_dimensions.is_empty() {
            sink.filter_bar(Scope::Table, &self.controls(Scope::Table));
        }
        sink.table(&self.spec.table_title, &self.table_headers(), &self.table_cells());
    }
}
