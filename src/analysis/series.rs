//! Data preparation for cost-over-time plots.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use super::columns::{ColumnRequest, resolve};
use super::learning_curve::LearningCurve;
use crate::error::AnalysisError;
use crate::table::Table;

/// One plotted point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: f64,
    pub cost: f64,
}

/// Technology -> points sorted by year, in first-seen technology order.
pub type CostSeries = IndexMap<String, Vec<SeriesPoint>>;

/// Column requests for [`prepare_series`].
#[derive(Debug, Clone)]
pub struct SeriesRequest {
    pub tech: ColumnRequest,
    pub cost: ColumnRequest,
    pub year: ColumnRequest,
    /// Exact name of the cumulative-capacity column. Never inferred.
    pub cumulative: Option<String>,
}

/// Groups `table` by technology and returns each group's `(year, cost)` series.
///
/// Tech, cost, and year columns are resolved through
/// [`resolve`](super::columns::resolve). Rows with no technology, or whose
/// year or cost is not numeric, are skipped. Groups appear in first-seen order and each group is
/// stably sorted by year. When `request.cumulative` names a column present in
/// the table, each sorted group's costs are passed through `curve`.
///
/// # Errors
///
/// [`AnalysisError::MissingColumn`] if the cost or year column cannot be
/// resolved.
pub fn prepare_series(
    table: &Table,
    request: &SeriesRequest,
    curve: &LearningCurve,
) -> Result<CostSeries, AnalysisError> {
    let tech = resolve(table, &request.tech)?;
    let cost = resolve(table, &request.cost)?;
    let year = resolve(table, &request.year)?;
    let table = tech.materialize(table);

    let (Some(tech_idx), Some(cost_idx), Some(year_idx)) = (
        table.column_index(tech.name()),
        table.column_index(cost.name()),
        table.column_index(year.name()),
    ) else {
        return Err(AnalysisError::MissingColumn {
            requested: request.tech.requested.clone(),
            patterns: request.tech.patterns.clone(),
        });
    };
    let cum_idx = request
        .cumulative
        .as_deref()
        .and_then(|name| table.column_index(name));

    let mut groups: IndexMap<String, Vec<(SeriesPoint, Option<f64>)>> = IndexMap::new();
    let mut skipped = 0_usize;
    for row in table.rows() {
        if row[tech_idx].is_missing() {
            skipped += 1;
            continue;
        }
        let (Some(y), Some(c)) = (row[year_idx].as_f64(), row[cost_idx].as_f64()) else {
            skipped += 1;
            continue;
        };
        let capacity = cum_idx.and_then(|i| row[i].as_f64());
        groups
            .entry(row[tech_idx].to_string())
            .or_default()
            .push((SeriesPoint { year: y, cost: c }, capacity));
    }
    if skipped > 0 {
        debug!(skipped, "rows without technology, numeric year, or cost were skipped");
    }

    let mut series = CostSeries::with_capacity(groups.len());
    for (name, mut points) in groups {
        points.sort_by(|a, b| a.0.year.total_cmp(&b.0.year));
        let mut out: Vec<SeriesPoint> = points.iter().map(|(p, _)| *p).collect();
        if cum_idx.is_some() {
            let costs: Vec<f64> = out.iter().map(|p| p.cost).collect();
            let caps: Vec<Option<f64>> = points.iter().map(|(_, cap)| *cap).collect();
            for (point, adjusted) in out.iter_mut().zip(curve.adjust(&costs, &caps)?) {
                point.cost = adjusted;
            }
        }
        series.insert(name, out);
    }

    info!(
        technologies = series.len(),
        tech_column = tech.name(),
        cost_column = cost.name(),
        year_column = year.name(),
        learning_curve = cum_idx.is_some(),
        "prepared cost series"
    );
    Ok(series)
}
