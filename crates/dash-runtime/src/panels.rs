//! The six bundled panels.

use crate::panel::{DimensionSpec, KpiCard, KpiFormat, PanelError, PanelSpec};
use dash_core::{DashboardConfig, Tone, Value};
use dash_view::{
    percent, usd, usd_cents, Cell, ChartKind, ChartSpec, DimensionMatch, LabelFormat, Renderers,
    ViewPlan,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelId {
    PlayerEngagement,
    PlayerMonetization,
    BudgetVsActuals,
    TopVarianceDrivers,
    ForecastAccuracy,
    ScenarioPlanning,
}

impl PanelId {
    pub const ALL: [PanelId; 6] = [
        PanelId::PlayerEngagement,
        PanelId::PlayerMonetization,
        PanelId::BudgetVsActuals,
        PanelId::TopVarianceDrivers,
        PanelId::ForecastAccuracy,
        PanelId::ScenarioPlanning,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            PanelId::PlayerEngagement => "player-engagement",
            PanelId::PlayerMonetization => "player-monetization",
            PanelId::BudgetVsActuals => "budget-vs-actuals",
            PanelId::TopVarianceDrivers => "top-variance-drivers",
            PanelId::ForecastAccuracy => "forecast-accuracy",
            PanelId::ScenarioPlanning => "scenario-planning",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PanelId::PlayerEngagement => "Player Engagement",
            PanelId::PlayerMonetization => "Player Monetization",
            PanelId::BudgetVsActuals => "Budget vs Actuals",
            PanelId::TopVarianceDrivers => "Top Variance Drivers",
            PanelId::ForecastAccuracy => "Forecast Accuracy",
            PanelId::ScenarioPlanning => "Scenario Planning",
        }
    }

    /// Name of the bundled dataset backing this panel.
    pub fn dataset(self) -> &'static str {
        match self {
            PanelId::PlayerEngagement => "player_engagement",
            PanelId::PlayerMonetization => "player_monetization",
            PanelId::BudgetVsActuals => "budget_vs_actuals",
            PanelId::TopVarianceDrivers => "top_variance_drivers",
            PanelId::ForecastAccuracy => "forecast_accuracy",
            PanelId::ScenarioPlanning => "scenario_planning",
        }
    }

    pub fn spec(self, cfg: &DashboardConfig) -> PanelSpec {
        let mut spec = match self {
            PanelId::PlayerEngagement => player_engagement(cfg),
            PanelId::PlayerMonetization => player_monetization(cfg),
            PanelId::BudgetVsActuals => budget_vs_actuals(),
            PanelId::TopVarianceDrivers => top_variance_drivers(),
            PanelId::ForecastAccuracy => forecast_accuracy(),
            PanelId::ScenarioPlanning => scenario_planning(),
        };
        spec.id = self;
        spec.title = self.title().to_string();
        spec.wildcard.clone_from(&cfg.wildcard);
        spec
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for PanelId {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PanelId::ALL
            .into_iter()
            .find(|id| id.slug() == s)
            .ok_or_else(|| PanelError::UnknownPanel(s.to_string()))
    }
}

fn base(id: PanelId, table_title: &str) -> PanelSpec {
    PanelSpec {
        id,
        title: String::new(),
        wildcard: String::new(),
        dimensions: Vec::new(),
        table_dimensions: Vec::new(),
        plan: ViewPlan::default(),
        charts: Vec::new(),
        cards: Vec::new(),
        table_title: table_title.to_string(),
        renderers: Renderers::new(),
        derived: Vec::new(),
    }
}

fn player_dimensions() -> Vec<DimensionSpec> {
    vec![
        DimensionSpec::from_dataset("game", "Game", "games"),
        DimensionSpec::from_dataset("platform", "Platform", "platforms"),
        DimensionSpec::from_dataset("country", "Country", "countries"),
        DimensionSpec::from_dataset("timePeriod", "Time Period", "timePeriods").starting_at_first(),
    ]
}

fn exact_all(dims: &[&str]) -> Vec<DimensionMatch> {
    dims.iter().map(|d| DimensionMatch::exact(d, d)).collect()
}

fn platform_chip(value: &Value) -> Cell {
    if value.as_text() == Some("iOS") {
        Cell::chip_with_icon("iOS", Tone::Default, "apple")
    } else {
        Cell::chip_with_icon("Android", Tone::Success, "android")
    }
}

fn exit_reason_chip(value: &Value) -> Cell {
    let tone = match value.as_text() {
        Some("rage-quit") => Tone::Error,
        Some("crash") => Tone::Warning,
        Some("afk") => Tone::Info,
        Some("natural") => Tone::Success,
        _ => Tone::Default,
    };
    Cell::chip(value.to_string(), tone)
}

fn error_pct_chip(value: &Value) -> Cell {
    match value.as_number() {
        Some(n) => {
            let tone = match n.abs() {
                e if e <= 5.0 => Tone::Success,
                e if e <= 10.0 => Tone::Warning,
                _ => Tone::Error,
            };
            Cell::chip(percent(n, 1), tone)
        }
        None => Cell::Raw(value.clone()),
    }
}

fn money(value: &Value) -> Cell {
    match value.as_number() {
        Some(n) => Cell::Text(usd(n)),
        None => Cell::Raw(value.clone()),
    }
}

fn money_cents(value: &Value) -> Cell {
    match value.as_number() {
        Some(n) => Cell::Text(usd_cents(n)),
        None => Cell::Raw(value.clone()),
    }
}

fn pct(value: &Value) -> Cell {
    match value.as_number() {
        Some(n) => Cell::Text(percent(n, 1)),
        None => Cell::Raw(value.clone()),
    }
}

fn player_engagement(cfg: &DashboardConfig) -> PanelSpec {
    let dates = LabelFormat::short_date(cfg);
    let mut table = exact_all(&["game", "platform", "country"]);
    table.push(DimensionMatch::current_period(
        "timePeriod",
        "date",
        &cfg.current_period_token,
    ));
    PanelSpec {
        dimensions: player_dimensions(),
        table_dimensions: vec![DimensionSpec::fixed(
            "exitReason",
            "Exit Reason",
            &["rage-quit", "afk", "natural", "crash"],
        )],
        plan: ViewPlan {
            chart: exact_all(&["game", "platform", "country", "timePeriod"]),
            table,
            table_scope: exact_all(&["exitReason"]),
        },
        charts: vec![
            ChartSpec::new("Daily Active Users", ChartKind::Bar, "date", dates.clone(), &["dau"]),
            ChartSpec::new("Ad Views", ChartKind::Line, "date", dates.clone(), &["adViews"]),
            ChartSpec::new("XP Earned", ChartKind::Line, "date", dates.clone(), &["xp"]),
            ChartSpec::new(
                "Exit Reasons",
                ChartKind::Bar,
                "date",
                dates,
                &["rageQuits", "crash", "afk", "natural"],
            ),
        ],
        cards: vec![
            KpiCard::new("Total DAU", "dau", KpiFormat::Grouped, "people", "#E8F5E9"),
            KpiCard::new("Avg Session Length", "avgSessionLength", KpiFormat::Plain, "timer", "#E3F2FD"),
            KpiCard::new("Rage Quits", "rageQuits", KpiFormat::Grouped, "mood_bad", "#FFEBEE"),
        ],
        renderers: Renderers::new()
            .with("platform", |v, _| platform_chip(v))
            .with("exitReason", |v, _| exit_reason_chip(v))
            .with("revenueUsd", |v, _| money_cents(v)),
        ..base(PanelId::PlayerEngagement, "Recent Sessions")
    }
}

fn player_monetization(cfg: &DashboardConfig) -> PanelSpec {
    PanelSpec {
        dimensions: player_dimensions(),
        plan: ViewPlan {
            chart: exact_all(&["game", "platform", "country", "timePeriod"]),
            table: exact_all(&["game", "platform", "country"]),
            table_scope: Vec::new(),
        },
        charts: vec![ChartSpec::new(
            "Revenue Trend",
            ChartKind::Line,
            "date",
            LabelFormat::short_date(cfg),
            &["revenueUsd"],
        )],
        cards: vec![
            KpiCard::new("Total Revenue", "totalRevenueUsd", KpiFormat::Usd, "attach_money", "#E8F5E9"),
            KpiCard::new("Avg Revenue/User", "avgRevenuePerUser", KpiFormat::UsdCents, "person", "#E3F2FD"),
            KpiCard::new("Top Item", "topItem", KpiFormat::Plain, "star", "#FFF8E1"),
            KpiCard::new("Conversion Rate", "conversionRate", KpiFormat::Plain, "trending_up", "#F3E5F5"),
        ],
        ..base(PanelId::PlayerMonetization, "Transactions")
    }
}

fn budget_vs_actuals() -> PanelSpec {
    PanelSpec {
        dimensions: vec![
            DimensionSpec::from_dataset("department", "Department", "departments"),
            DimensionSpec::from_dataset("region", "Region", "regions"),
            DimensionSpec::from_dataset("timePeriod", "Time Period", "timePeriods").starting_at_first(),
        ],
        table_dimensions: vec![
            DimensionSpec::tokens("costCenter", "Cost Center", "costCenter"),
            DimensionSpec::fixed("variance", "Variance", &["Over Budget", "Under Budget"]),
        ],
        plan: ViewPlan {
            chart: exact_all(&["department", "region", "timePeriod"]),
            table: Vec::new(),
            table_scope: vec![
                DimensionMatch::prefix("costCenter", "costCenter"),
                DimensionMatch::direction("variance", "variance", "Over Budget", "Under Budget"),
            ],
        },
        charts: vec![ChartSpec::new(
            "Budget vs Actuals",
            ChartKind::Bar,
            "month",
            LabelFormat::Raw,
            &["actual", "budget"],
        )],
        cards: vec![
            KpiCard::new("Under Budget", "underBudget", KpiFormat::Usd, "savings", "#E8F5E9"),
            KpiCard::new("Over Budget", "overBudget", KpiFormat::Usd, "warning", "#FFEBEE"),
            KpiCard::new("Cost Centers", "totalCostCenters", KpiFormat::Plain, "business", "#E3F2FD"),
        ],
        ..base(PanelId::BudgetVsActuals, "Cost Center Detail")
    }
}

fn top_variance_drivers() -> PanelSpec {
    PanelSpec {
        dimensions: vec![
            DimensionSpec::from_dataset("department", "Department", "departments"),
            DimensionSpec::from_dataset("region", "Region", "regions"),
            DimensionSpec::from_dataset("timePeriod", "Time Period", "timePeriods").starting_at_first(),
        ],
        table_dimensions: vec![DimensionSpec::fixed(
            "category",
            "Category",
            &["Infrastructure", "Media", "Headcount", "Facilities", "T&E"],
        )],
        plan: ViewPlan {
            chart: exact_all(&["department", "region", "timePeriod"]),
            table: exact_all(&["department", "region"]),
            table_scope: exact_all(&["category"]),
        },
        charts: vec![ChartSpec::new(
            "Variance by Driver",
            ChartKind::Bar,
            "driver",
            LabelFormat::Raw,
            &["variance"],
        )],
        cards: vec![
            KpiCard::new("Top Driver", "topDriver", KpiFormat::Plain, "insights", "#FFF8E1"),
            KpiCard::new("Net Variance", "netVariance", KpiFormat::Usd, "balance", "#FFEBEE"),
            KpiCard::new("Drivers Flagged", "driversFlagged", KpiFormat::Plain, "flag", "#E3F2FD"),
        ],
        renderers: Renderers::new()
            .with("variance", |v, _| money(v))
            .with("variancePct", |v, _| pct(v)),
        ..base(PanelId::TopVarianceDrivers, "Variance Drivers")
    }
}

fn forecast_accuracy() -> PanelSpec {
    PanelSpec {
        dimensions: vec![
            DimensionSpec::from_dataset("department", "Department", "departments"),
            DimensionSpec::from_dataset("timePeriod", "Time Period", "timePeriods").starting_at_first(),
        ],
        plan: ViewPlan {
            chart: exact_all(&["department", "timePeriod"]),
            table: exact_all(&["department"]),
            table_scope: Vec::new(),
        },
        charts: vec![ChartSpec::new(
            "Forecast vs Actual",
            ChartKind::Line,
            "month",
            LabelFormat::Raw,
            &["forecast", "actual"],
        )],
        cards: vec![
            KpiCard::new("MAPE", "mape", KpiFormat::Plain, "percent", "#E3F2FD"),
            KpiCard::new("Bias", "bias", KpiFormat::Plain, "balance", "#FFF8E1"),
            KpiCard::new("Best Department", "bestDepartment", KpiFormat::Plain, "emoji_events", "#E8F5E9"),
        ],
        renderers: Renderers::new()
            .with("forecast", |v, _| money(v))
            .with("actual", |v, _| money(v))
            .with("errorPct", |v, _| error_pct_chip(v)),
        ..base(PanelId::ForecastAccuracy, "Forecast Detail")
    }
}

fn scenario_planning() -> PanelSpec {
    PanelSpec {
        dimensions: vec![
            DimensionSpec::from_dataset("region", "Region", "regions"),
            DimensionSpec::from_dataset("timePeriod", "Time Period", "timePeriods").starting_at_first(),
        ],
        table_dimensions: vec![DimensionSpec::from_dataset("scenario", "Scenario", "scenarios")],
        plan: ViewPlan {
            chart: exact_all(&["region", "timePeriod"]),
            table: exact_all(&["region"]),
            table_scope: exact_all(&["scenario"]),
        },
        charts: vec![ChartSpec::new(
            "Revenue Scenarios",
            ChartKind::Line,
            "month",
            LabelFormat::Raw,
            &["baseline", "optimistic", "pessimistic"],
        )],
        cards: vec![
            KpiCard::new("Expected Revenue", "expectedRevenue", KpiFormat::Usd, "trending_flat", "#E3F2FD"),
            KpiCard::new("Best Case", "bestCaseRevenue", KpiFormat::Usd, "trending_up", "#E8F5E9"),
            KpiCard::new("Worst Case", "worstCaseRevenue", KpiFormat::Usd, "trending_down", "#FFEBEE"),
        ],
        renderers: Renderers::new()
            .with("revenue", |v, _| money(v))
            .with("cost", |v, _| money(v))
            .with("margin", |v, _| pct(v))
            .with("probability", |v, _| match v.as_number() {
                Some(p) => Cell::Text(percent(p * 100.0, 0)),
                None => Cell::Raw(v.clone()),
            }),
        ..base(PanelId::ScenarioPlanning, "Scenario Detail")
    }
}
