//! Pipeline stages: read CSV at the stage boundary, transform, write artifacts.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::analysis::demand::{scenario_yearly_means, yearly_totals};
use crate::analysis::preprocess::clean;
use crate::analysis::scenario::project;
use crate::analysis::series::prepare_series;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::io::export::{export_series_json, export_yearly_csv};
use crate::io::table_csv::{read_table_file, write_table_file};

/// Long-format scenario projection, inside `processed_dir`.
pub const SCENARIO_RESULTS_FILE: &str = "scenario_results.csv";
/// Technology cost series, inside `figures_dir`.
pub const LCOE_SERIES_FILE: &str = "lcoe_series.json";
/// Yearly consumption totals, inside `figures_dir`.
pub const GLOBAL_DEMAND_FILE: &str = "global_demand.csv";
/// Per-scenario yearly means, inside `figures_dir`.
pub const SCENARIO_DEMAND_FILE: &str = "scenario_demand.json";

/// Pipeline stage identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preprocess,
    Scenarios,
    Demand,
    Costs,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Preprocess => "preprocess",
            Self::Scenarios => "scenarios",
            Self::Demand => "demand",
            Self::Costs => "costs",
        };
        f.pad(name)
    }
}

/// One artifact written by a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    /// Stage that produced the artifact.
    pub stage: Stage,
    /// Where it was written.
    pub path: PathBuf,
    /// Rows (or series entries) written.
    pub rows: usize,
}

/// Cleans every `*.csv` in `raw_dir` into `processed_dir` under the same name.
///
/// Files are processed in path order. The configured cost file is copied
/// without cleaning.
///
/// # Errors
///
/// Returns the first read, clean, or write failure.
pub fn run_preprocess(cfg: &PipelineConfig) -> Result<Vec<StageOutput>, PipelineError> {
    let clean_cfg = cfg.clean_config();
    let mut outputs = Vec::new();
    for input in csv_files(&cfg.data.raw_dir)? {
        let Some(name) = input.file_name() else {
            continue;
        };
        info!(input = %input.display(), "processing");
        let table = read_table_file(&input)?;
        // the cost table has its own shape and is passed through unchanged
        let cleaned = if name.to_string_lossy() == cfg.data.cost_file {
            table
        } else {
            clean(&table, &clean_cfg)?
        };
        let out = cfg.data.processed_dir.join(name);
        write_table_file(&cleaned, &out)?;
        info!(output = %out.display(), rows = cleaned.len(), "wrote cleaned data");
        outputs.push(StageOutput {
            stage: Stage::Preprocess,
            path: out,
            rows: cleaned.len(),
        });
    }
    if outputs.is_empty() {
        warn!(raw_dir = %cfg.data.raw_dir.display(), "no CSV files to preprocess");
    }
    Ok(outputs)
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let pattern = dir.join("*.csv");
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .map_err(|e| {
            PipelineError::io(
                dir,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
            )
        })?
        .filter_map(Result::ok)
        .collect();
    files.sort();
    Ok(files)
}

/// Projects every configured scenario over the consumption table.
///
/// # Errors
///
/// Returns read/write failures, or the projection's `AnalysisError`.
pub fn run_scenarios(cfg: &PipelineConfig) -> Result<StageOutput, PipelineError> {
    let input = cfg.data.processed_dir.join(&cfg.data.consumption_file);
    let table = read_table_file(&input)?;
    let results = project(&table, &cfg.scenarios, &cfg.projection())?;
    let out = cfg.data.processed_dir.join(SCENARIO_RESULTS_FILE);
    write_table_file(&results, &out)?;
    info!(output = %out.display(), rows = results.len(), "wrote scenario results");
    Ok(StageOutput {
        stage: Stage::Scenarios,
        path: out,
        rows: results.len(),
    })
}

/// Aggregates yearly demand and, when scenario results exist, per-scenario means.
///
/// # Errors
///
/// Returns read/write failures or a missing-column error.
pub fn run_demand(cfg: &PipelineConfig) -> Result<Vec<StageOutput>, PipelineError> {
    let cols = &cfg.columns;
    let input = cfg.data.processed_dir.join(&cfg.data.consumption_file);
    let table = read_table_file(&input)?;
    let totals = yearly_totals(&table, &cols.year, &cols.consumption)?;
    let totals_path = cfg.data.figures_dir.join(GLOBAL_DEMAND_FILE);
    export_yearly_csv(&totals, &totals_path)?;
    let mut outputs = vec![StageOutput {
        stage: Stage::Demand,
        path: totals_path,
        rows: totals.len(),
    }];

    let results_path = cfg.data.processed_dir.join(SCENARIO_RESULTS_FILE);
    if results_path.exists() {
        let results = read_table_file(&results_path)?;
        let means = scenario_yearly_means(&results, &cols.scenario, &cols.year, &cols.adjusted)?;
        let means_path = cfg.data.figures_dir.join(SCENARIO_DEMAND_FILE);
        export_series_json(&means, &means_path)?;
        outputs.push(StageOutput {
            stage: Stage::Demand,
            path: means_path,
            rows: means.len(),
        });
    } else {
        info!(path = %results_path.display(), "no scenario results yet, skipping comparison");
    }
    Ok(outputs)
}

/// Prepares the technology cost series for the levelized-cost plot.
///
/// # Errors
///
/// Returns read/write failures or a column-resolution error.
pub fn run_costs(cfg: &PipelineConfig) -> Result<StageOutput, PipelineError> {
    let input = cfg.data.processed_dir.join(&cfg.data.cost_file);
    let table = read_table_file(&input)?;
    info!(columns = ?table.columns(), "cost table columns detected");
    let series = prepare_series(
        &table,
        &cfg.cost_model.series_request(),
        &cfg.cost_model.learning_curve(),
    )?;
    let out = cfg.data.figures_dir.join(LCOE_SERIES_FILE);
    export_series_json(&series, &out)?;
    Ok(StageOutput {
        stage: Stage::Costs,
        path: out,
        rows: series.len(),
    })
}

/// Runs every local stage in order: preprocess, scenarios, demand, costs.
///
/// The cost stage is skipped with a warning when its input file is absent.
///
/// # Errors
///
/// Stops at the first failing stage.
pub fn run_all(cfg: &PipelineConfig) -> Result<Vec<StageOutput>, PipelineError> {
    let mut outputs = run_preprocess(cfg)?;
    outputs.push(run_scenarios(cfg)?);
    outputs.extend(run_demand(cfg)?);

    let cost_input = cfg.data.processed_dir.join(&cfg.data.cost_file);
    if cost_input.exists() {
        outputs.push(run_costs(cfg)?);
    } else {
        warn!(path = %cost_input.display(), "cost table not found, skipping cost series");
    }
    Ok(outputs)
}
