use dash_core::{DashboardConfig, DatasetError, Insight, Tone, Value};
use dash_runtime::{
    open_panel, FilterControl, KpiCardView, Panel, PanelError, PanelId, RenderSink, Scope,
};
use dash_view::{Cell, ChartData, ChartKind};

fn open(id: PanelId) -> Panel {
    let ds = dash_data::load_embedded(id.dataset()).unwrap();
    open_panel(id, &DashboardConfig::default(), ds).unwrap()
}

fn texts<'a>(panel: &'a Panel, field: &str, table: bool) -> Vec<&'a str> {
    let rows = if table {
        panel.table_rows()
    } else {
        panel.chart_rows()
    };
    rows.into_iter().filter_map(|r| r.text(field)).collect()
}

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    charts: Vec<(String, ChartKind, ChartData)>,
    tables: Vec<(Vec<String>, Vec<Vec<Cell>>)>,
}

impl RenderSink for Recorder {
    fn title(&mut self, title: &str) {
        self.events.push(format!("title:{title}"));
    }

    fn filter_bar(&mut self, scope: Scope, controls: &[FilterControl]) {
        self.events.push(format!("filters:{scope:?}:{}", controls.len()));
    }

    fn summary_cards(&mut self, cards: &[KpiCardView]) {
        self.events.push(format!("cards:{}", cards.len()));
    }

    fn insights(&mut self, insights: &[Insight]) {
        self.events.push(format!("insights:{}", insights.len()));
    }

    fn chart(&mut self, title: &str, kind: ChartKind, data: &ChartData) {
        self.events.push(format!("chart:{title}"));
        self.charts.push((title.to_string(), kind, data.clone()));
    }

    fn table(&mut self, title: &str, headers: &[&str], rows: &[Vec<Cell>]) {
        self.events.push(format!("table:{title}"));
        self.tables.push((
            headers.iter().map(|h| h.to_string()).collect(),
            rows.to_vec(),
        ));
    }
}

#[test]
fn every_panel_opens_over_its_bundled_dataset() {
    for id in PanelId::ALL {
        let panel = open(id);
        assert_eq!(panel.id(), id);
        assert!(!panel.chart_rows().is_empty(), "{id} starts with no chart rows");
        assert!(!panel.table_rows().is_empty(), "{id} starts with no table rows");
        assert_eq!(panel.table_headers().len(), panel.dataset().table_columns.len());
    }
}

#[test]
fn engagement_starts_on_current_period() {
    let panel = open(PanelId::PlayerEngagement);
    let controls = panel.controls(Scope::Global);
    let period = controls.iter().find(|c| c.dimension == "timePeriod").unwrap();
    assert_eq!(period.selected, "July 2025");
    assert_eq!(period.options, vec!["All", "July 2025", "June 2025"]);
    let game = controls.iter().find(|c| c.dimension == "game").unwrap();
    assert_eq!(game.selected, "All");
    assert_eq!(game.options[0], "All");

    assert_eq!(panel.view().chart_indices(), &[2, 3, 4, 5, 6, 7]);
    assert_eq!(panel.view().table_indices(), &[0, 2, 3, 4, 5, 7]);
}

#[test]
fn engagement_game_selection_preserves_order() {
    let mut panel = open(PanelId::PlayerEngagement);
    panel.select(Scope::Global, "game", "Galaxy Raiders");
    assert_eq!(panel.view().chart_indices(), &[2, 5]);
    assert_eq!(texts(&panel, "date", false), vec!["2025-07-01", "2025-07-03"]);
    assert_eq!(texts(&panel, "sessionId", true), vec!["S-10231", "S-10234", "S-10235"]);
}

#[test]
fn table_period_filter_ignores_selected_value() {
    let mut panel = open(PanelId::PlayerEngagement);
    panel.select(Scope::Global, "game", "Galaxy Raiders");
    panel.select(Scope::Global, "timePeriod", "June 2025");
    assert_eq!(texts(&panel, "date", false), vec!["2025-06-29"]);
    // Table rows still come from the current period.
    assert_eq!(texts(&panel, "sessionId", true), vec!["S-10231", "S-10234", "S-10235"]);

    panel.select(Scope::Global, "timePeriod", "All");
    assert_eq!(panel.table_rows().len(), 3);
    assert_eq!(panel.chart_rows().len(), 3);
}

#[test]
fn scopes_are_independent() {
    let mut panel = open(PanelId::PlayerEngagement);
    panel.select(Scope::Global, "game", "Galaxy Raiders");
    let chart_before = panel.view().chart_indices().to_vec();

    panel.select(Scope::Table, "exitReason", "natural");
    assert_eq!(panel.view().chart_indices(), chart_before.as_slice());
    assert_eq!(texts(&panel, "sessionId", true), vec!["S-10234"]);
    assert_eq!(panel.get(Scope::Global, "exitReason"), None);
    assert_eq!(panel.get(Scope::Table, "game"), None);

    panel.reset(Scope::Table);
    assert_eq!(panel.table_rows().len(), 3);
    assert_eq!(panel.get(Scope::Global, "game"), Some("Galaxy Raiders"));
}

#[test]
fn summary_and_insights_ignore_filters() {
    for id in PanelId::ALL {
        let mut panel = open(id);
        let summary = panel.summary().clone();
        let insights = panel.insights().to_vec();
        let cards = panel.cards().to_vec();
        for control in panel.controls(Scope::Global) {
            if let Some(last) = control.options.last() {
                panel.select(Scope::Global, &control.dimension, last);
            }
        }
        for control in panel.controls(Scope::Table) {
            if let Some(last) = control.options.last() {
                panel.select(Scope::Table, &control.dimension, last);
            }
        }
        assert_eq!(panel.summary(), &summary, "{id}");
        assert_eq!(panel.insights(), insights.as_slice(), "{id}");
        assert_eq!(panel.cards(), cards.as_slice(), "{id}");
    }
}

#[test]
fn cost_center_prefix_and_direction() {
    let mut panel = open(PanelId::BudgetVsActuals);
    let controls = panel.controls(Scope::Table);
    assert_eq!(controls[0].options, vec!["All", "Eng", "Mkt", "Ops", "Sales"]);
    assert_eq!(controls[1].options, vec!["All", "Over Budget", "Under Budget"]);

    panel.select(Scope::Table, "costCenter", "Eng");
    assert_eq!(
        texts(&panel, "costCenter", true),
        vec!["Eng-101 Platform", "Eng-202 Data"]
    );
    panel.select(Scope::Table, "variance", "Over Budget");
    assert_eq!(texts(&panel, "costCenter", true), vec!["Eng-101 Platform"]);

    panel.select(Scope::Table, "costCenter", "All");
    panel.select(Scope::Table, "variance", "Under Budget");
    // Zero variance is neither over nor under.
    assert_eq!(
        texts(&panel, "costCenter", true),
        vec!["Eng-202 Data", "Ops-401 Facilities", "Mkt-302 Performance"]
    );
}

#[test]
fn budget_table_ignores_global_scope() {
    let mut panel = open(PanelId::BudgetVsActuals);
    assert_eq!(panel.chart_rows().len(), 5);
    panel.select(Scope::Global, "department", "Marketing");
    assert_eq!(texts(&panel, "month", false), vec!["Apr", "May"]);
    assert_eq!(panel.table_rows().len(), 6);
}

#[test]
fn row_missing_a_formatted_column_is_rejected() {
    let mut ds = dash_data::load_embedded("budget_vs_actuals").unwrap();
    ds.table_data[0] = ds.table_data[0]
        .clone()
        .into_iter()
        .filter(|(field, _)| field != "variance")
        .collect();
    let err = open_panel(PanelId::BudgetVsActuals, &DashboardConfig::default(), ds).unwrap_err();
    assert_eq!(
        err,
        PanelError::Dataset(DatasetError::MissingColumnField {
            row: 0,
            field: "variance".into()
        })
    );

    let mut ds = dash_data::load_embedded("forecast_accuracy").unwrap();
    ds.table_data[2] = ds.table_data[2]
        .clone()
        .into_iter()
        .filter(|(field, _)| field != "errorPct")
        .collect();
    assert!(open_panel(PanelId::ForecastAccuracy, &DashboardConfig::default(), ds).is_err());
}

#[test]
fn budget_table_cells_are_verbatim() {
    let panel = open(PanelId::BudgetVsActuals);
    let cells = panel.table_cells();
    assert_eq!(
        cells[0],
        vec![
            Cell::Raw(Value::from("Eng-101 Platform")),
            Cell::Raw(Value::from("Engineering")),
            Cell::Raw(Value::from(395000i64)),
            Cell::Raw(Value::from(410000i64)),
            Cell::Raw(Value::from(-15000i64)),
            Cell::Raw(Value::from("-3.8%")),
        ]
    );
}

#[test]
fn unknown_selection_fails_closed() {
    let mut panel = open(PanelId::ForecastAccuracy);
    panel.select(Scope::Global, "department", "Legal");
    assert!(panel.chart_rows().is_empty());
    assert!(panel.table_rows().is_empty());
    assert!(panel.charts().iter().all(|(_, data)| data.is_no_data()));
    assert_eq!(panel.get(Scope::Global, "department"), Some("Legal"));
}

#[test]
fn cards_are_formatted_from_summary() {
    let values = |id| {
        open(id)
            .cards()
            .iter()
            .map(|c| c.value.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(
        values(PanelId::PlayerEngagement),
        vec!["48,210", "14.2 min", "1,312"]
    );
    assert_eq!(
        values(PanelId::PlayerMonetization),
        vec!["$72,776.9", "$1.51", "Battle Pass", "3.8%"]
    );
    assert_eq!(
        values(PanelId::BudgetVsActuals),
        vec!["$31,000", "$26,000", "6"]
    );
}

#[test]
fn render_follows_layout_order() {
    let panel = open(PanelId::PlayerEngagement);
    let mut sink = Recorder::default();
    panel.render(&mut sink);
    assert_eq!(
        sink.events,
        vec![
            "title:Player Engagement",
            "filters:Global:4",
            "cards:3",
            "insights:4",
            "chart:Daily Active Users",
            "chart:Ad Views",
            "chart:XP Earned",
            "chart:Exit Reasons",
            "filters:Table:1",
            "table:Recent Sessions",
        ]
    );

    let (_, kind, data) = &sink.charts[0];
    assert_eq!(*kind, ChartKind::Bar);
    let series = data.series().unwrap();
    assert_eq!(
        series.labels,
        vec!["Jul 1", "Jul 1", "Jul 2", "Jul 3", "Jul 4", "Jul 5"]
    );
    let exits = sink.charts[3].2.series().unwrap();
    assert_eq!(exits.datasets.len(), 4);
    assert_eq!(exits.datasets[0].label, "Rage Quits");
    assert_eq!(exits.datasets[0].values.last(), Some(&None));

    let (headers, rows) = &sink.tables[0];
    assert_eq!(headers[0], "Session ID");
    let platform = headers.iter().position(|h| h == "Platform").unwrap();
    let revenue = headers.iter().position(|h| h == "Revenue").unwrap();
    assert_eq!(rows[0][platform], Cell::chip_with_icon("iOS", Tone::Default, "apple"));
    assert_eq!(rows[0][revenue], Cell::Text("$4.99".into()));
    assert_eq!(rows[0][0], Cell::Raw(Value::from("S-10231")));
}

#[test]
fn panels_without_table_scope_skip_its_filter_bar() {
    let panel = open(PanelId::ForecastAccuracy);
    let mut sink = Recorder::default();
    panel.render(&mut sink);
    assert!(!sink.events.iter().any(|e| e.starts_with("filters:Table")));
    assert_eq!(sink.events.last().map(String::as_str), Some("table:Forecast Detail"));
}

#[test]
fn empty_selection_renders_no_data() {
    let mut panel = open(PanelId::PlayerEngagement);
    panel.select(Scope::Global, "game", "Farm Frenzy");
    panel.select(Scope::Global, "country", "JP");
    let mut sink = Recorder::default();
    panel.render(&mut sink);
    assert_eq!(sink.charts.len(), 4);
    assert!(sink.charts.iter().all(|(_, _, d)| *d == ChartData::NoData));
    assert!(sink.tables[0].1.is_empty());
}

#[test]
fn scenario_table_scope_uses_dataset_catalog() {
    let mut panel = open(PanelId::ScenarioPlanning);
    panel.select(Scope::Table, "scenario", "Baseline");
    assert_eq!(texts(&panel, "region", true), vec!["North America", "EMEA"]);
    panel.select(Scope::Global, "region", "EMEA");
    assert_eq!(texts(&panel, "region", true), vec!["EMEA"]);
    assert_eq!(texts(&panel, "month", false), vec!["Jan", "Feb"]);
}

#[test]
fn config_drives_current_period_token() {
    let cfg = DashboardConfig {
        current_period_token: "2025-06".into(),
        ..Default::default()
    };
    let ds = dash_data::load_embedded("player_engagement").unwrap();
    let panel = open_panel(PanelId::PlayerEngagement, &cfg, ds).unwrap();
    assert_eq!(texts(&panel, "sessionId", true), vec!["S-10232", "S-10237"]);
}

mod props {
    use super::*;
    use proptest::prelude::*;

    fn apply(panel: &mut Panel, scope: Scope, picks: &[(usize, usize)]) {
        let controls = panel.controls(scope);
        if controls.is_empty() {
            return;
        }
        for &(c, o) in picks {
            let control = &controls[c % controls.len()];
            let value = &control.options[o % control.options.len()];
            panel.select(scope, &control.dimension, value);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn any_selection_sequence_keeps_view_consistent(
            panel_idx in 0usize..6,
            global in proptest::collection::vec((0usize..8, 0usize..8), 0..6),
            table in proptest::collection::vec((0usize..8, 0usize..8), 0..6),
        ) {
            let id = PanelId::ALL[panel_idx];
            let mut panel = open(id);
            let summary = panel.summary().clone();
            apply(&mut panel, Scope::Global, &global);
            apply(&mut panel, Scope::Table, &table);

            let chart = panel.view().chart_indices();
            let rows = panel.view().table_indices();
            prop_assert!(chart.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(rows.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(chart.iter().all(|&i| i < panel.dataset().chart_data.len()));
            prop_assert!(rows.iter().all(|&i| i < panel.dataset().table_data.len()));
            prop_assert_eq!(panel.summary(), &summary);

            // Table filters never move the chart.
            let before = panel.view().chart_indices().to_vec();
            panel.reset(Scope::Table);
            prop_assert_eq!(panel.view().chart_indices(), before.as_slice());
            prop_assert_eq!(panel.table_cells().len(), panel.view().table_indices().len());
        }
    }
}
