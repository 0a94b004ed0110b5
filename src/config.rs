//! TOML-based pipeline configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::analysis::columns::{ColumnKind, ColumnRequest};
use crate::analysis::learning_curve::{DEFAULT_LEARNING_RATE, LearningCurve};
use crate::analysis::preprocess::CleanConfig;
use crate::analysis::scenario::{ProjectionConfig, ScenarioParams};
use crate::analysis::series::SeriesRequest;

/// Top-level pipeline configuration parsed from TOML.
///
/// Every section has defaults matching the baseline pipeline. Load from TOML
/// with [`PipelineConfig::from_toml_file`] or use [`PipelineConfig::baseline`]
/// for the built-in default. The struct is passed explicitly to each stage;
/// nothing in the analysis modules reads configuration on its own.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directories and download sources.
    #[serde(default)]
    pub data: DataConfig,
    /// Column names shared by the cleaning, projection, and demand stages.
    #[serde(default)]
    pub columns: ColumnsConfig,
    /// Cleaning-stage parameters.
    #[serde(default)]
    pub preprocess: PreprocessConfig,
    /// Levelized-cost series parameters.
    #[serde(default)]
    pub cost_model: CostModelConfig,
    /// Scenario bundles in definition order.
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<ScenarioParams>,
}

/// Directories and download sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Where downloaded CSVs land.
    pub raw_dir: PathBuf,
    /// Where cleaned CSVs and scenario results are written.
    pub processed_dir: PathBuf,
    /// Where series artifacts for plotting are written.
    pub figures_dir: PathBuf,
    /// File name (inside `processed_dir`) the scenario and demand stages read.
    pub consumption_file: String,
    /// File name (inside `processed_dir`) the cost stage reads.
    pub cost_file: String,
    /// Remote CSV sources.
    pub sources: Vec<SourceConfig>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            figures_dir: PathBuf::from("figures"),
            consumption_file: "sample_energy.csv".to_string(),
            cost_file: "lcoe.csv".to_string(),
            sources: vec![SourceConfig {
                name: "sample_energy".to_string(),
                url: "https://raw.githubusercontent.com/owid/energy-data/master/owid-energy-data.csv"
                    .to_string(),
            }],
        }
    }
}

/// A named remote CSV.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Local file stem; the download is saved as `<name>.csv`.
    pub name: String,
    /// HTTP(S) location of the CSV.
    pub url: String,
}

/// Column names shared across stages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnsConfig {
    pub country: String,
    pub year: String,
    pub consumption: String,
    pub population: String,
    pub per_capita: String,
    pub scenario: String,
    pub adjusted: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            country: "country".to_string(),
            year: "year".to_string(),
            consumption: "primary_energy_consumption".to_string(),
            population: "population".to_string(),
            per_capita: "energy_per_capita".to_string(),
            scenario: "scenario".to_string(),
            adjusted: "cons_adj".to_string(),
        }
    }
}

/// Cleaning-stage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessConfig {
    /// Rows whose z-score on the consumption column exceeds this are dropped.
    pub z_threshold: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { z_threshold: 4.0 }
    }
}

/// Levelized-cost series parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostModelConfig {
    pub tech_column: String,
    pub cost_column: String,
    pub year_column: String,
    /// Learning-curve adjustment applies only when this exact column exists.
    pub cumulative_column: String,
    pub tech_patterns: Vec<String>,
    pub cost_patterns: Vec<String>,
    pub year_patterns: Vec<String>,
    /// Learning-curve exponent.
    pub learning_rate: f64,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            tech_column: "technology".to_string(),
            cost_column: "capex".to_string(),
            year_column: "year".to_string(),
            cumulative_column: "cumulative_capacity".to_string(),
            tech_patterns: strings(&["tech", "name"]),
            cost_patterns: strings(&["cost", "capex", "price"]),
            year_patterns: strings(&["year", "date"]),
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

impl CostModelConfig {
    /// Resolver request for the technology (grouping) column.
    pub fn tech_request(&self) -> ColumnRequest {
        ColumnRequest::new(&self.tech_column, ColumnKind::Grouping)
            .with_patterns(self.tech_patterns.iter().cloned())
    }

    /// Resolver request for the cost column.
    pub fn cost_request(&self) -> ColumnRequest {
        ColumnRequest::new(&self.cost_column, ColumnKind::Numeric)
            .with_patterns(self.cost_patterns.iter().cloned())
    }

    /// Resolver request for the year column.
    pub fn year_request(&self) -> ColumnRequest {
        ColumnRequest::new(&self.year_column, ColumnKind::Numeric)
            .with_patterns(self.year_patterns.iter().cloned())
    }

    /// Column requests for [`prepare_series`](crate::analysis::series::prepare_series).
    pub fn series_request(&self) -> SeriesRequest {
        SeriesRequest {
            tech: self.tech_request(),
            cost: self.cost_request(),
            year: self.year_request(),
            cumulative: Some(self.cumulative_column.clone()),
        }
    }

    /// Learning curve with the configured rate.
    pub fn learning_curve(&self) -> LearningCurve {
        LearningCurve::new(self.learning_rate)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn scenario(
    name: &str,
    carbon_price: f64,
    gdp_growth: f64,
    population_growth: f64,
    efficiency_improvement: f64,
    electrification_rate: f64,
) -> ScenarioParams {
    ScenarioParams {
        name: name.to_string(),
        carbon_price: Some(carbon_price),
        gdp_growth: Some(gdp_growth),
        population_growth: Some(population_growth),
        efficiency_improvement: Some(efficiency_improvement),
        electrification_rate: Some(electrification_rate),
    }
}

fn default_scenarios() -> Vec<ScenarioParams> {
    vec![
        scenario("baseline", 50.0, 0.03, 0.01, 0.005, 0.02),
        scenario("high_policy", 100.0, 0.025, 0.008, 0.015, 0.05),
        scenario("low_policy", 20.0, 0.04, 0.012, 0.002, 0.01),
        scenario("accelerated_tech", 75.0, 0.03, 0.009, 0.02, 0.06),
    ]
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"preprocess.z_threshold"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

impl PipelineConfig {
    /// Returns the baseline pipeline: four policy scenarios, OWID source.
    pub fn baseline() -> Self {
        Self {
            data: DataConfig::default(),
            columns: ColumnsConfig::default(),
            preprocess: PreprocessConfig::default(),
            cost_model: CostModelConfig::default(),
            scenarios: default_scenarios(),
        }
    }

    /// Returns the carbon-sweep preset: identical growth, rising carbon price.
    pub fn carbon_sweep() -> Self {
        Self {
            scenarios: [0.0, 50.0, 100.0, 200.0]
                .iter()
                .map(|&price| scenario(&format!("carbon_{price}"), price, 0.03, 0.01, 0.005, 0.02))
                .collect(),
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "carbon_sweep"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "carbon_sweep" => Ok(Self::carbon_sweep()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Cleaning settings derived from the column names and thresholds.
    pub fn clean_config(&self) -> CleanConfig {
        CleanConfig {
            group_column: self.columns.country.clone(),
            year_column: self.columns.year.clone(),
            value_column: self.columns.consumption.clone(),
            population_column: self.columns.population.clone(),
            per_capita_column: self.columns.per_capita.clone(),
            z_threshold: self.preprocess.z_threshold,
        }
    }

    /// Projection settings derived from the column names.
    pub fn projection(&self) -> ProjectionConfig {
        ProjectionConfig {
            consumption_column: self.columns.consumption.clone(),
            scenario_column: self.columns.scenario.clone(),
            output_column: self.columns.adjusted.clone(),
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let z = self.preprocess.z_threshold;
        if z.is_nan() || z <= 0.0 {
            errors.push(ConfigError::new("preprocess.z_threshold", "must be > 0"));
        }

        let cm = &self.cost_model;
        if !cm.learning_rate.is_finite() {
            errors.push(ConfigError::new(
                "cost_model.learning_rate",
                "must be a finite number",
            ));
        }
        for (field, name) in [
            ("cost_model.tech_column", &cm.tech_column),
            ("cost_model.cost_column", &cm.cost_column),
            ("cost_model.year_column", &cm.year_column),
            ("columns.consumption", &self.columns.consumption),
            ("columns.year", &self.columns.year),
            ("columns.country", &self.columns.country),
        ] {
            if name.trim().is_empty() {
                errors.push(ConfigError::new(field, "must not be empty"));
            }
        }

        let mut seen = HashSet::new();
        for (i, source) in self.data.sources.iter().enumerate() {
            if !seen.insert(source.name.as_str()) {
                errors.push(ConfigError::new(
                    format!("data.sources[{i}].name"),
                    format!("duplicate source \"{}\"", source.name),
                ));
            }
        }

        if self.scenarios.is_empty() {
            errors.push(ConfigError::new("scenarios", "at least one scenario is required"));
        }
        let mut seen = HashSet::new();
        for (i, s) in self.scenarios.iter().enumerate() {
            if s.name.trim().is_empty() {
                errors.push(ConfigError::new(
                    format!("scenarios[{i}].name"),
                    "must not be empty",
                ));
            }
            if !seen.insert(s.name.as_str()) {
                errors.push(ConfigError::new(
                    format!("scenarios[{i}].name"),
                    format!("duplicate scenario \"{}\"", s.name),
                ));
            }
            for field in s.missing_fields() {
                errors.push(ConfigError::new(
                    format!("scenarios[{i}].{field}"),
                    "is required",
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = PipelineConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
        assert_eq!(cfg.scenarios.len(), 4);
        assert_eq!(cfg.scenarios[0].name, "baseline");
    }

    #[test]
    fn from_preset_unknown() {
        let err = PipelineConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in PipelineConfig::PRESETS {
            let cfg = PipelineConfig::from_preset(name).expect("preset should load");
            let errors = cfg.validate();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[data]
raw_dir = "in"
processed_dir = "out"

[[data.sources]]
name = "owid"
url = "https://example.org/owid.csv"

[columns]
consumption = "energy_twh"

[cost_model]
learning_rate = 0.2

[[scenarios]]
name = "baseline"
carbon_price = 50
gdp_growth = 0.03
population_growth = 0.01
efficiency_improvement = 0.005
electrification_rate = 0.02
"#;
        let cfg = PipelineConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(
            cfg.as_ref().map(|c| c.data.raw_dir.clone()),
            Some(PathBuf::from("in"))
        );
        assert_eq!(cfg.as_ref().map(|c| c.scenarios.len()), Some(1));
        assert_eq!(
            cfg.as_ref().map(|c| c.columns.consumption.as_str()),
            Some("energy_twh")
        );
        assert_eq!(cfg.as_ref().map(|c| c.cost_model.learning_rate), Some(0.2));
        // untouched section keeps defaults
        assert_eq!(cfg.as_ref().map(|c| c.preprocess.z_threshold), Some(4.0));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[preprocess]
z_threshold = 3.0
bogus_field = true
"#;
        assert!(PipelineConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn omitted_scenarios_use_defaults() {
        let cfg = PipelineConfig::from_toml_str("[preprocess]\nz_threshold = 3.0\n");
        assert_eq!(cfg.map(|c| c.scenarios.len()).ok(), Some(4));
    }

    #[test]
    fn validation_reports_incomplete_scenario() {
        let toml = r#"
[[scenarios]]
name = "partial"
carbon_price = 10
"#;
        let cfg = PipelineConfig::from_toml_str(toml).expect("partial scenario should parse");
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "scenarios[0].gdp_growth"));
        assert!(errors.iter().any(|e| e.field == "scenarios[0].electrification_rate"));
        assert!(!errors.iter().any(|e| e.field == "scenarios[0].carbon_price"));
    }

    #[test]
    fn validation_catches_duplicate_scenarios() {
        let mut cfg = PipelineConfig::baseline();
        cfg.scenarios[1].name = "baseline".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "scenarios[1].name"));
    }

    #[test]
    fn validation_catches_bad_threshold() {
        let mut cfg = PipelineConfig::baseline();
        cfg.preprocess.z_threshold = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "preprocess.z_threshold"));
    }

    #[test]
    fn carbon_sweep_varies_only_carbon_price() {
        let cfg = PipelineConfig::carbon_sweep();
        let gdp: Vec<_> = cfg.scenarios.iter().map(|s| s.gdp_growth).collect();
        assert!(gdp.iter().all(|g| *g == Some(0.03)));
        assert_eq!(cfg.scenarios[3].name, "carbon_200");
    }

    #[test]
    fn cost_requests_carry_patterns() {
        let cm = CostModelConfig::default();
        let tech = cm.tech_request();
        assert_eq!(tech.requested, "technology");
        assert_eq!(tech.kind, ColumnKind::Grouping);
        assert_eq!(tech.patterns, vec!["tech", "name"]);
        assert_eq!(cm.cost_request().kind, ColumnKind::Numeric);
    }
}
