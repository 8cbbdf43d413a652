#![deny(warnings)]

//! Headless dashboard: open one panel, apply selections, print it as text.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use dash_core::Insight;
use dash_runtime::{open_panel, FilterControl, KpiCardView, PanelId, RenderSink, Scope};
use dash_view::{Cell, ChartData, ChartKind};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dash-cli", version)]
#[command(about = "Render a dashboard panel to the terminal")]
struct Args {
    /// Dashboard configuration (YAML); defaults to the bundled one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Panel id, e.g. player-engagement
    #[arg(long)]
    panel: Option<String>,

    /// Dataset document (JSON) to use instead of the bundled one
    #[arg(long)]
    data: Option<PathBuf>,

    /// Global selection, DIM=VALUE (repeatable)
    #[arg(long = "filter", value_parser = parse_selection)]
    filters: Vec<(String, String)>,

    /// Table-only selection, DIM=VALUE (repeatable)
    #[arg(long = "table-filter", value_parser = parse_selection)]
    table_filters: Vec<(String, String)>,

    /// List panel ids and exit
    #[arg(long)]
    list: bool,
}

fn parse_selection(s: &str) -> Result<(String, String)> {
    let (dim, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected DIM=VALUE, got `{s}`"))?;
    let dim = dim.trim();
    if dim.is_empty() {
        return Err(anyhow!("empty dimension in `{s}`"));
    }
    Ok((dim.to_string(), value.trim().to_string()))
}

/// Plain-text rendering collaborator.
#[derive(Default)]
struct TextSink {
    out: String,
}

impl TextSink {
    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }
}

impl RenderSink for TextSink {
    fn title(&mut self, title: &str) {
        self.line(format!("== {title} =="));
    }

    fn filter_bar(&mut self, scope: Scope, controls: &[FilterControl]) {
        let parts: Vec<String> = controls
            .iter()
            .map(|c| format!("{}: {} [{}]", c.label, c.selected, c.options.join(" | ")))
            .collect();
        let name = match scope {
            Scope::Global => "filters",
            Scope::Table => "table filters",
        };
        self.line(format!("{name}: {}", parts.join("; ")));
    }

    fn summary_cards(&mut self, cards: &[KpiCardView]) {
        let parts: Vec<String> = cards.iter().map(|c| format!("{}: {}", c.title, c.value)).collect();
        self.line(parts.join("  |  "));
    }

    fn insights(&mut self, insights: &[Insight]) {
        for i in insights {
            self.line(format!("  ({:?}) {}", i.severity.tone(), i.message));
        }
    }

    fn chart(&mut self, title: &str, kind: ChartKind, data: &ChartData) {
        self.line(format!("-- {title} ({kind:?})"));
        match data {
            ChartData::NoData => self.line("   no data"),
            ChartData::Series(s) => {
                self.line(format!("   {}", s.labels.join(", ")));
                for d in &s.datasets {
                    let values: Vec<String> = d
                        .values
                        .iter()
                        .map(|v| v.map(|n| n.to_string()).unwrap_or_else(|| "-".into()))
                        .collect();
                    self.line(format!("   {} {}: {}", d.label, d.color, values.join(", ")));
                }
            }
        }
    }

    fn table(&mut self, title: &str, headers: &[&str], rows: &[Vec<Cell>]) {
        self.line(format!("-- {title} ({} rows)", rows.len()));
        self.line(headers.join(" | "));
        for row in rows {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            self.line(cells.join(" | "));
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        "starting dash-cli"
    );

    if args.list {
        for id in PanelId::ALL {
            println!("{id}\t{}", id.title());
        }
        return Ok(());
    }

    let cfg = dash_data::load_config(args.config.as_deref())?;
    let slug = args.panel.as_deref().unwrap_or(cfg.default_panel.as_str());
    let id: PanelId = slug.parse()?;
    let dataset = match &args.data {
        Some(path) => dash_data::load_dataset_file(path)?,
        None => dash_data::load_embedded(id.dataset())?,
    };
    let mut panel =
        open_panel(id, &cfg, dataset).with_context(|| format!("opening panel {id}"))?;

    for (dim, value) in &args.filters {
        panel.select(Scope::Global, dim, value);
    }
    for (dim, value) in &args.table_filters {
        panel.select(Scope::Table, dim, value);
    }

    let mut sink = TextSink::default();
    panel.render(&mut sink);
    print!("{}", sink.out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::DashboardConfig;

    #[test]
    fn selections_split_on_first_equals() {
        assert_eq!(
            parse_selection("game=Puzzle Quest").unwrap(),
            ("game".to_string(), "Puzzle Quest".to_string())
        );
        assert_eq!(
            parse_selection("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_selection("game").is_err());
        assert!(parse_selection("=x").is_err());
    }

    #[test]
    fn args_collect_repeated_filters() {
        let args = Args::try_parse_from([
            "dash-cli",
            "--panel",
            "budget-vs-actuals",
            "--filter",
            "region=EMEA",
            "--table-filter",
            "costCenter=Eng",
            "--table-filter",
            "variance=Over Budget",
        ])
        .unwrap();
        assert_eq!(args.panel.as_deref(), Some("budget-vs-actuals"));
        assert_eq!(args.filters.len(), 1);
        assert_eq!(args.table_filters[1].1, "Over Budget");
        assert!(!args.list);
    }

    #[test]
    fn text_sink_renders_panel() {
        let ds = dash_data::load_embedded("budget_vs_actuals").unwrap();
        let mut panel =
            open_panel(PanelId::BudgetVsActuals, &DashboardConfig::default(), ds).unwrap();
        panel.select(Scope::Table, "costCenter", "Mkt");
        let mut sink = TextSink::default();
        panel.render(&mut sink);
        let out = sink.out;
        assert!(out.starts_with("== Budget vs Actuals =="));
        assert!(out.contains("Under Budget: $31,000"));
        assert!(out.contains("-- Cost Center Detail (2 rows)"));
        assert!(out.contains("Mkt-301 Brand | Marketing | 140000 | 151000 | -11000 | -7.9%"));
    }

    #[test]
    fn no_data_is_printed() {
        let mut sink = TextSink::default();
        sink.chart("Revenue", ChartKind::Line, &ChartData::NoData);
        assert_eq!(sink.out, "-- Revenue (Line)\n   no data\n");
    }
}
