//! Scenario definitions and the long-format consumption projection.

use std::collections::HashSet;

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::table::{Table, Value};

/// A scenario bundle as loaded from configuration.
///
/// Parameters are optional here so that an incomplete bundle can be reported
/// by name instead of failing deserialization wholesale. Convert with
/// [`Scenario::try_from`] before use.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioParams {
    pub name: String,
    pub carbon_price: Option<f64>,
    pub gdp_growth: Option<f64>,
    pub population_growth: Option<f64>,
    pub efficiency_improvement: Option<f64>,
    pub electrification_rate: Option<f64>,
}

impl ScenarioParams {
    /// Names of the parameters that are not set.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("carbon_price", self.carbon_price),
            ("gdp_growth", self.gdp_growth),
            ("population_growth", self.population_growth),
            ("efficiency_improvement", self.efficiency_improvement),
            ("electrification_rate", self.electrification_rate),
        ]
        .into_iter()
        .filter_map(|(field, v)| v.is_none().then_some(field))
        .collect()
    }
}

/// A complete, immutable scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    name: String,
    /// Carbon price (currency per tonne).
    pub carbon_price: f64,
    /// Annual GDP growth as a fraction.
    pub gdp_growth: f64,
    /// Annual population growth as a fraction.
    pub population_growth: f64,
    /// Annual efficiency improvement as a fraction.
    pub efficiency_improvement: f64,
    /// Annual electrification rate as a fraction.
    pub electrification_rate: f64,
}

impl Scenario {
    /// Scenario identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Projected consumption for one base value:
    /// `consumption * (1 + gdp_growth) / (1 + carbon_price / 1000)`.
    pub fn adjust_consumption(&self, consumption: f64) -> f64 {
        consumption * (1.0 + self.gdp_growth) / (1.0 + self.carbon_price / 1000.0)
    }
}

impl TryFrom<&ScenarioParams> for Scenario {
    type Error = AnalysisError;

    fn try_from(p: &ScenarioParams) -> Result<Self, Self::Error> {
        let require = |field: &'static str, v: Option<f64>| {
            v.ok_or_else(|| AnalysisError::MissingField {
                scenario: p.name.clone(),
                field,
            })
        };
        Ok(Self {
            name: p.name.clone(),
            carbon_price: require("carbon_price", p.carbon_price)?,
            gdp_growth: require("gdp_growth", p.gdp_growth)?,
            population_growth: require("population_growth", p.population_growth)?,
            efficiency_improvement: require("efficiency_improvement", p.efficiency_improvement)?,
            electrification_rate: require("electrification_rate", p.electrification_rate)?,
        })
    }
}

/// Column names the projection reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Base consumption column (read).
    pub consumption_column: String,
    /// Scenario label column (written).
    pub scenario_column: String,
    /// Adjusted consumption column (written).
    pub output_column: String,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            consumption_column: "primary_energy_consumption".to_string(),
            scenario_column: "scenario".to_string(),
            output_column: "cons_adj".to_string(),
        }
    }
}

/// Validates every bundle up front, in order, and rejects duplicate names.
///
/// # Errors
///
/// [`AnalysisError::MissingField`] for the first incomplete bundle, or
/// [`AnalysisError::DuplicateScenario`] for the first repeated name.
pub fn validate_scenarios(params: &[ScenarioParams]) -> Result<Vec<Scenario>, AnalysisError> {
    let mut seen = HashSet::new();
    params
        .iter()
        .map(|p| {
            if !seen.insert(p.name.as_str()) {
                return Err(AnalysisError::DuplicateScenario(p.name.clone()));
            }
            Scenario::try_from(p)
        })
        .collect()
}

/// Applies each scenario to `table` and concatenates the results.
///
/// Every scenario produces a full copy of the input with the scenario label
/// and the adjusted consumption appended (or overwritten, if those columns
/// already exist). Copies are concatenated in scenario order; rows keep their
/// input order within each copy. Non-numeric consumption cells produce a
/// missing adjusted value.
///
/// # Errors
///
/// * [`AnalysisError::MissingField`] / [`AnalysisError::DuplicateScenario`]
///   from [`validate_scenarios`], before any row is computed.
/// * [`AnalysisError::MissingColumn`] if the consumption column is absent.
pub fn project(
    table: &Table,
    scenarios: &[ScenarioParams],
    config: &ProjectionConfig,
) -> Result<Table, AnalysisError> {
    let scenarios = validate_scenarios(scenarios)?;
    let consumption_idx = table.column_index(&config.consumption_column).ok_or_else(|| {
        AnalysisError::MissingColumn {
            requested: config.consumption_column.clone(),
            patterns: Vec::new(),
        }
    })?;

    // shared by every partition
    let header = Table::new(table.columns().iter().cloned())
        .with_column(&config.scenario_column, Vec::new())
        .with_column(&config.output_column, Vec::new());
    let scenario_idx = header.column_index(&config.scenario_column);
    let output_idx = header.column_index(&config.output_column);

    let partitions: Vec<Vec<Vec<Value>>> = scenarios
        .par_iter()
        .map(|scenario| {
            debug!(scenario = scenario.name(), rows = table.len(), "projecting scenario");
            table
                .rows()
                .iter()
                .map(|row| {
                    let mut out = row.clone();
                    out.resize(header.columns().len(), Value::Missing);
                    let adjusted = row[consumption_idx]
                        .as_f64()
                        .map(|c| scenario.adjust_consumption(c));
                    if let Some(i) = scenario_idx {
                        out[i] = Value::from(scenario.name());
                    }
                    if let Some(i) = output_idx {
                        out[i] = Value::from(adjusted);
                    }
                    out
                })
                .collect()
        })
        .collect();

    let rows = partitions.into_iter().flatten().collect();
    let result = Table::from_parts(header.columns().to_vec(), rows);
    info!(
        scenarios = scenarios.len(),
        input_rows = table.len(),
        output_rows = result.len(),
        "scenario projection complete"
    );
    Ok(result)
}
