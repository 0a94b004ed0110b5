//! Error types for table transforms and pipeline stages.

use thiserror::Error;

use crate::config::ConfigError;

/// Data-shape failures raised by the analysis transforms.
///
/// These are deterministic: retrying with the same table and parameters
/// produces the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A required column is absent and no substitute could be inferred.
    #[error("missing column `{requested}` (tried patterns: [{}])", .patterns.join(", "))]
    MissingColumn {
        /// Column name the caller asked for.
        requested: String,
        /// Candidate patterns that were scanned without a match.
        patterns: Vec<String>,
    },
    /// A scenario bundle lacks one of its required numeric parameters.
    #[error("scenario `{scenario}` is missing field `{field}`")]
    MissingField {
        /// Name of the incomplete scenario.
        scenario: String,
        /// Name of the absent parameter.
        field: &'static str,
    },
    /// An operation that needs at least one row received none.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),
    /// Paired sequences have different lengths.
    #[error("length mismatch: {costs} costs vs {capacities} cumulative capacities")]
    LengthMismatch {
        /// Number of cost values.
        costs: usize,
        /// Number of cumulative capacity values.
        capacities: usize,
    },
    /// Two scenarios share a name.
    #[error("duplicate scenario name `{0}`")]
    DuplicateScenario(String),
    /// A cell could not be interpreted the way the transform requires.
    #[error("invalid value {value:?} in column `{column}` at row {row}")]
    InvalidValue {
        /// Column holding the offending cell.
        column: String,
        /// Zero-based data row index.
        row: usize,
        /// Display form of the cell.
        value: String,
    },
}

/// Failures of a pipeline stage: I/O at the stage boundary or the transform itself.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("i/o error on `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Config(Vec<ConfigError>),
    #[cfg(feature = "fetch")]
    #[error("download of `{url}` failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl PipelineError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
