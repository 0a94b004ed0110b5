//! Yearly demand aggregates for the demand and scenario comparison plots.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::AnalysisError;
use crate::table::Table;

/// One `(year, value)` aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i64,
    pub value: f64,
}

/// Scenario -> yearly means, scenarios in first-seen order.
pub type ScenarioDemand = IndexMap<String, Vec<YearValue>>;

fn index_of(table: &Table, name: &str) -> Result<usize, AnalysisError> {
    table
        .column_index(name)
        .ok_or_else(|| AnalysisError::MissingColumn {
            requested: name.to_string(),
            patterns: Vec::new(),
        })
}

/// Sums `value_col` per year, ascending by year.
///
/// Rows with a non-numeric year or value are ignored. Years are truncated to
/// whole numbers.
///
/// # Errors
///
/// [`AnalysisError::MissingColumn`] if either column is absent.
pub fn yearly_totals(
    table: &Table,
    year_col: &str,
    value_col: &str,
) -> Result<Vec<YearValue>, AnalysisError> {
    let year_idx = index_of(table, year_col)?;
    let value_idx = index_of(table, value_col)?;

    let mut totals: BTreeMap<i64, f64> = BTreeMap::new();
    for row in table.rows() {
        if let (Some(y), Some(v)) = (row[year_idx].as_f64(), row[value_idx].as_f64()) {
            *totals.entry(y.trunc() as i64).or_default() += v;
        }
    }
    Ok(totals
        .into_iter()
        .map(|(year, value)| YearValue { year, value })
        .collect())
}

/// Averages `value_col` per (scenario, year).
///
/// # Errors
///
/// [`AnalysisError::MissingColumn`] if any of the three columns is absent.
pub fn scenario_yearly_means(
    table: &Table,
    scenario_col: &str,
    year_col: &str,
    value_col: &str,
) -> Result<ScenarioDemand, AnalysisError> {
    let scenario_idx = index_of(table, scenario_col)?;
    let year_idx = index_of(table, year_col)?;
    let value_idx = index_of(table, value_col)?;

    let mut acc: IndexMap<String, BTreeMap<i64, (f64, usize)>> = IndexMap::new();
    for row in table.rows() {
        let by_year = acc.entry(row[scenario_idx].to_string()).or_default();
        if let (Some(y), Some(v)) = (row[year_idx].as_f64(), row[value_idx].as_f64()) {
            let slot = by_year.entry(y.trunc() as i64).or_insert((0.0, 0));
            slot.0 += v;
            slot.1 += 1;
        }
    }

    Ok(acc
        .into_iter()
        .map(|(scenario, by_year)| {
            let points = by_year
                .into_iter()
                .map(|(year, (sum, n))| YearValue {
                    year,
                    value: sum / n as f64,
                })
                .collect();
            (scenario, points)
        })
        .collect())
}
