#![deny(warnings)]

//! Bundled dashboard assets and loaders.
//!
//! Panel datasets and the default configuration are embedded at compile time
//! so the dashboard runs without filesystem reads; explicit paths override
//! them.

use anyhow::{Context, Result};
use dash_core::{validate_config, DashboardConfig, Dataset};
use std::fs;
use std::path::Path;
use tracing::info;

/// Names of the embedded panel datasets.
pub const DATASET_NAMES: [&str; 6] = [
    "player_engagement",
    "player_monetization",
    "budget_vs_actuals",
    "top_variance_drivers",
    "forecast_accuracy",
    "scenario_planning",
];

/// Raw JSON of an embedded dataset.
pub fn embedded_dataset(name: &str) -> Option<&'static str> {
    match name {
        "player_engagement" => Some(include_str!("../../../assets/data/player_engagement.json")),
        "player_monetization" => {
            Some(include_str!("../../../assets/data/player_monetization.json"))
        }
        "budget_vs_actuals" => Some(include_str!("../../../assets/data/budget_vs_actuals.json")),
        "top_variance_drivers" => {
            Some(include_str!("../../../assets/data/top_variance_drivers.json"))
        }
        "forecast_accuracy" => Some(include_str!("../../../assets/data/forecast_accuracy.json")),
        "scenario_planning" => Some(include_str!("../../../assets/data/scenario_planning.json")),
        _ => None,
    }
}

/// Raw YAML of the default dashboard configuration.
pub fn embedded_config() -> &'static str {
    include_str!("../../../assets/config/dashboard.yaml")
}

/// Parse an embedded dataset by name.
pub fn load_embedded(name: &str) -> Result<Dataset> {
    let json = embedded_dataset(name).with_context(|| format!("unknown embedded dataset: {name}"))?;
    let ds = Dataset::from_json(json).with_context(|| format!("embedded dataset {name}"))?;
    info!(dataset = name, "loaded embedded dataset");
    Ok(ds)
}

/// Read and parse a dataset document from disk.
pub fn load_dataset_file(path: &Path) -> Result<Dataset> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading dataset {}", path.display()))?;
    let ds = Dataset::from_json(&text).with_context(|| format!("parsing dataset {}", path.display()))?;
    info!(path = %path.display(), "loaded dataset file");
    Ok(ds)
}

/// Parse and validate a YAML configuration document.
pub fn parse_config(yaml: &str) -> Result<DashboardConfig> {
    let cfg: DashboardConfig = serde_yaml::from_str(yaml).context("parsing dashboard config")?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Load the configuration at `path`, or the embedded default.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p)
                .with_context(|| format!("reading config {}", p.display()))?;
            let cfg = parse_config(&text).with_context(|| format!("config {}", p.display()))?;
            info!(path = %p.display(), "loaded dashboard config");
            Ok(cfg)
        }
        None => parse_config(embedded_config()),
    }
}
