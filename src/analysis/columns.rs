//! Best-effort column inference for tables whose headers vary by source.
//!
//! Resolution order for a requested name:
//!
//! 1. the exact column, if present;
//! 2. the first column containing the first matching pattern
//!    (case-insensitive substring, patterns in priority order);
//! 3. the first all-numeric column;
//! 4. for grouping requests only, a synthetic constant column.
//!
//! Numeric requests that reach step 4 fail with
//! [`AnalysisError::MissingColumn`].

use std::borrow::Cow;

use tracing::warn;

use crate::error::AnalysisError;
use crate::table::{Table, Value};

/// Literal assigned to every row of a synthetic grouping column.
pub const SYNTHETIC_GROUP_VALUE: &str = "all";

/// What the resolved column will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Category labels; may fall back to a synthetic constant column.
    Grouping,
    /// Numeric measurements; fails when nothing can be inferred.
    Numeric,
}

/// A column lookup: the preferred name plus ordered fallback patterns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRequest {
    /// Name the caller expects.
    pub requested: String,
    /// Substring patterns in priority order.
    pub patterns: Vec<String>,
    /// Grouping or numeric.
    pub kind: ColumnKind,
}

impl ColumnRequest {
    /// Creates a request with no fallback patterns.
    pub fn new(requested: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            requested: requested.into(),
            patterns: Vec::new(),
            kind,
        }
    }

    /// Sets the candidate patterns, replacing any existing ones.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Name used for the synthetic grouping column.
    pub fn synthetic_name(&self) -> String {
        format!("_all_{}_", self.requested)
    }
}

/// Outcome of a column lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The requested column exists.
    Exact(String),
    /// A column matched one of the candidate patterns.
    Pattern { column: String, pattern: String },
    /// No pattern matched; the first all-numeric column was taken.
    FirstNumeric(String),
    /// Nothing matched; a constant grouping column must be added.
    Synthetic(String),
}

impl Resolution {
    /// The column name to read from.
    pub fn name(&self) -> &str {
        match self {
            Self::Exact(c) | Self::FirstNumeric(c) | Self::Synthetic(c) => c,
            Self::Pattern { column, .. } => column,
        }
    }

    /// Returns a table on which [`Resolution::name`] exists.
    ///
    /// Only synthetic resolutions produce a new table; every other variant
    /// borrows the input unchanged.
    pub fn materialize<'a>(&self, table: &'a Table) -> Cow<'a, Table> {
        match self {
            Self::Synthetic(name) => Cow::Owned(table.with_column(
                name,
                vec![Value::from(SYNTHETIC_GROUP_VALUE); table.len()],
            )),
            _ => Cow::Borrowed(table),
        }
    }
}

/// Resolves `request` against `table`'s columns.
///
/// The table is never modified; call [`Resolution::materialize`] to obtain a
/// table that contains a synthetic column.
///
/// # Errors
///
/// Returns [`AnalysisError::MissingColumn`] for a numeric request with no
/// exact, pattern, or all-numeric match.
///
/// # Examples
///
/// ```
/// use energy_scenarios::analysis::columns::{resolve, ColumnKind, ColumnRequest};
/// use energy_scenarios::table::Table;
///
/// let table = Table::new(["Technology Type", "capex_usd", "yr"]);
/// let request = ColumnRequest::new("technology", ColumnKind::Grouping)
///     .with_patterns(["tech", "name"]);
/// let resolved = resolve(&table, &request).unwrap();
/// assert_eq!(resolved.name(), "Technology Type");
/// ```
pub fn resolve(table: &Table, request: &ColumnRequest) -> Result<Resolution, AnalysisError> {
    if table.has_column(&request.requested) {
        return Ok(Resolution::Exact(request.requested.clone()));
    }

    let resolution = infer(table, request)?;
    match &resolution {
        Resolution::Pattern { column, pattern } => warn!(
            requested = %request.requested,
            resolved = %column,
            %pattern,
            "inferred column from pattern"
        ),
        Resolution::FirstNumeric(column) => warn!(
            requested = %request.requested,
            resolved = %column,
            "no pattern matched, using first numeric column"
        ),
        Resolution::Synthetic(column) => warn!(
            requested = %request.requested,
            resolved = %column,
            "no column matched, grouping all rows under a single category"
        ),
        Resolution::Exact(_) => {}
    }
    Ok(resolution)
}

fn infer(table: &Table, request: &ColumnRequest) -> Result<Resolution, AnalysisError> {
    let lowered: Vec<String> = table.columns().iter().map(|c| c.to_lowercase()).collect();
    for pattern in &request.patterns {
        let needle = pattern.to_lowercase();
        if let Some(idx) = lowered.iter().position(|c| c.contains(&needle)) {
            return Ok(Resolution::Pattern {
                column: table.columns()[idx].clone(),
                pattern: pattern.clone(),
            });
        }
    }

    if let Some(column) = table.columns().iter().find(|c| table.is_numeric_column(c)) {
        return Ok(Resolution::FirstNumeric(column.clone()));
    }

    match request.kind {
        ColumnKind::Grouping => Ok(Resolution::Synthetic(request.synthetic_name())),
        ColumnKind::Numeric => Err(AnalysisError::MissingColumn {
            requested: request.requested.clone(),
            patterns: request.patterns.clone(),
        }),
    }
}
