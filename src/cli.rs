//! Command-line interface definition and parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Energy-data pipeline: clean CSVs, project scenarios, prepare plot series.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Load configuration from a TOML file.
    #[arg(short, long, global = true, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Use a built-in preset (baseline, carbon_sweep).
    #[arg(short, long, global = true)]
    pub preset: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Pipeline stage to run.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Download configured sources into the raw data directory.
    #[cfg(feature = "fetch")]
    Fetch,
    /// Clean raw CSVs into the processed directory.
    Preprocess,
    /// Project every scenario over the processed consumption table.
    Scenarios,
    /// Aggregate yearly demand and per-scenario means.
    Demand,
    /// Prepare technology cost series with learning-curve adjustment.
    Costs,
    /// Run preprocess, scenarios, demand, and costs in order.
    Run,
    /// Validate the configuration and list scenarios.
    Check,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn import() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}
