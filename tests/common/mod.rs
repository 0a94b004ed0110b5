//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use energy_scenarios::config::PipelineConfig;
use energy_scenarios::io::table_csv::read_table;
use energy_scenarios::table::Table;

/// Consumption table with an all-empty column, an exact duplicate row, and a
/// row without consumption.
pub const CONSUMPTION_CSV: &str = "\
country,year,primary_energy_consumption,population,notes
A,2020,100,10,
A,2021,,10,
B,2020,200,20,
A,2020,100,10,
";

/// Cost table: wind has no capacity data, solar doubles capacity in 2021.
pub const COST_CSV: &str = "\
technology,year,capex,cumulative_capacity
wind,2021,90,
wind,2020,100,
solar,2020,200,50
solar,2021,180,100
";

/// Parses CSV text into a table.
pub fn table(csv: &str) -> Table {
    read_table(csv.as_bytes()).expect("fixture CSV should parse")
}

/// Baseline config whose directories all live under `root`.
pub fn config_in(root: &Path) -> PipelineConfig {
    let mut cfg = PipelineConfig::baseline();
    cfg.data.raw_dir = root.join("raw");
    cfg.data.processed_dir = root.join("processed");
    cfg.data.figures_dir = root.join("figures");
    cfg
}

/// Writes the consumption and cost fixtures into `raw_dir`.
pub fn seed_raw(cfg: &PipelineConfig) {
    fs::create_dir_all(&cfg.data.raw_dir).expect("raw dir should be creatable");
    fs::write(cfg.data.raw_dir.join(&cfg.data.consumption_file), CONSUMPTION_CSV)
        .expect("consumption fixture should be writable");
    fs::write(cfg.data.raw_dir.join(&cfg.data.cost_file), COST_CSV)
        .expect("cost fixture should be writable");
}

/// TOML config pointing every directory under `root`, with two scenarios.
pub fn write_config_toml(root: &Path) -> PathBuf {
    let path = root.join("config.toml");
    let body = format!(
        r#"[data]
raw_dir = "{raw}"
processed_dir = "{processed}"
figures_dir = "{figures}"

[[scenarios]]
name = "baseline"
carbon_price = 50.0
gdp_growth = 0.03
population_growth = 0.01
efficiency_improvement = 0.005
electrification_rate = 0.02

[[scenarios]]
name = "high_policy"
carbon_price = 100.0
gdp_growth = 0.025
population_growth = 0.008
efficiency_improvement = 0.015
electrification_rate = 0.05
"#,
        raw = toml_path(&root.join("raw")),
        processed = toml_path(&root.join("processed")),
        figures = toml_path(&root.join("figures")),
    );
    fs::write(&path, body).expect("config should be writable");
    path
}

fn toml_path(p: &Path) -> String {
    p.display().to_string().replace('\\', "/")
}
