#![deny(warnings)]

//! Panel runtime: one dataset, two filter scopes, one derived view.
//!
//! A [`Panel`] owns its filter state exclusively. Every selection change
//! recomputes the derived view before returning, so callers never observe a
//! stale or partial view. Summary KPIs and insights are projected once at
//! construction and never follow the filters.

mod panel;
mod panels;

pub use panel::{
    CatalogSource, DimensionSpec, FilterControl, Initial, KpiCard, KpiCardView, KpiFormat, Panel,
    PanelError, PanelSpec,
};
pub use panels::PanelId;

use dash_core::Insight;
use dash_view::{Cell, ChartData, ChartKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which of a panel's two independent filter states a selection targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Drives charts (and, per panel, the table).
    Global,
    /// Drives only the table.
    Table,
}

/// The rendering collaborator. Receives finished data, never raw rows.
pub trait RenderSink {
    fn title(&mut self, title: &str);
    fn filter_bar(&mut self, scope: Scope, controls: &[FilterControl]);
    fn summary_cards(&mut self, cards: &[KpiCardView]);
    fn insights(&mut self, insights: &[Insight]);
    fn chart(&mut self, title: &str, kind: ChartKind, data: &ChartData);
    fn table(&mut self, title: &str, headers: &[&str], rows: &[Vec<Cell>]);
}

/// Build the panel `id` over `dataset` with the given configuration.
pub fn open_panel(
    id: PanelId,
    cfg: &dash_core::DashboardConfig,
    dataset: dash_core::Dataset,
) -> Result<Panel, PanelError> {
    Panel::new(id.spec(cfg), Arc::new(dataset))
}
