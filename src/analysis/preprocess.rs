//! Cleaning stage for raw country/year energy tables.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::table::{Table, Value};

/// Columns and thresholds used by [`clean`].
#[derive(Debug, Clone, PartialEq)]
pub struct CleanConfig {
    /// Grouping column for sorting and gap filling (e.g. country).
    pub group_column: String,
    /// Year column; truncated to whole numbers.
    pub year_column: String,
    /// Measurement screened for outliers.
    pub value_column: String,
    /// Optional divisor for the per-capita column.
    pub population_column: String,
    /// Name of the derived per-capita column.
    pub per_capita_column: String,
    /// Maximum absolute z-score kept.
    pub z_threshold: f64,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            group_column: "country".to_string(),
            year_column: "year".to_string(),
            value_column: "primary_energy_consumption".to_string(),
            population_column: "population".to_string(),
            per_capita_column: "energy_per_capita".to_string(),
            z_threshold: 4.0,
        }
    }
}

#[derive(Hash, PartialEq, Eq)]
enum CellKey<'a> {
    Number(u64),
    Text(&'a str),
    Missing,
}

fn row_key(row: &[Value]) -> Vec<CellKey<'_>> {
    row.iter()
        .map(|v| match v {
            Value::Number(n) => CellKey::Number(n.to_bits()),
            Value::Text(s) => CellKey::Text(s),
            Value::Missing => CellKey::Missing,
        })
        .collect()
}

fn require(table: &Table, name: &str) -> Result<usize, AnalysisError> {
    table
        .column_index(name)
        .ok_or_else(|| AnalysisError::MissingColumn {
            requested: name.to_string(),
            patterns: Vec::new(),
        })
}

/// Cleans a raw table.
///
/// Steps, in order:
///
/// 1. drop columns with no non-missing cell;
/// 2. drop exact duplicate rows, keeping the first;
/// 3. truncate years to whole numbers;
/// 4. drop rows whose value is non-numeric or whose z-score exceeds the
///    threshold (sample standard deviation; skipped when it is zero or
///    undefined);
/// 5. sort by group then year, and fill gaps within each group forward then
///    backward;
/// 6. add `value / population` when a population column exists.
///
/// # Errors
///
/// * [`AnalysisError::MissingColumn`] if the group, year, or value column is
///   absent after step 1.
/// * [`AnalysisError::InvalidValue`] for a non-numeric year.
pub fn clean(table: &Table, config: &CleanConfig) -> Result<Table, AnalysisError> {
    let empty: Vec<&str> = table
        .columns()
        .iter()
        .filter(|c| table.column(c).is_some_and(|mut cells| cells.all(Value::is_missing)))
        .map(String::as_str)
        .collect();
    if !empty.is_empty() {
        debug!(columns = ?empty, "dropping all-missing columns");
    }
    let table = table.drop_columns(&empty);

    let group_idx = require(&table, &config.group_column)?;
    let year_idx = require(&table, &config.year_column)?;
    let value_idx = require(&table, &config.value_column)?;

    let mut seen = HashSet::new();
    let mut rows: Vec<Vec<Value>> = table
        .rows()
        .iter()
        .filter(|row| seen.insert(row_key(row)))
        .cloned()
        .collect();
    let duplicates = table.len() - rows.len();

    for (i, row) in rows.iter_mut().enumerate() {
        let year = match &row[year_idx] {
            Value::Number(n) => n.trunc(),
            other => {
                return Err(AnalysisError::InvalidValue {
                    column: config.year_column.clone(),
                    row: i,
                    value: other.to_string(),
                });
            }
        };
        row[year_idx] = Value::Number(year);
    }

    let before_outliers = rows.len();
    let rows = drop_outliers(rows, value_idx, config.z_threshold);
    let outliers = before_outliers - rows.len();

    let mut rows = rows;
    rows.sort_by(|a, b| {
        a[group_idx]
            .to_string()
            .cmp(&b[group_idx].to_string())
            .then_with(|| {
                let ya = a[year_idx].as_f64().unwrap_or(f64::NAN);
                let yb = b[year_idx].as_f64().unwrap_or(f64::NAN);
                ya.total_cmp(&yb)
            })
    });
    fill_within_groups(&mut rows, group_idx);

    let mut out = Table::from_parts(table.columns().to_vec(), rows);
    if let Some(pop_idx) = out.column_index(&config.population_column) {
        let per_capita: Vec<Value> = out
            .rows()
            .iter()
            .map(|row| match (row[value_idx].as_f64(), row[pop_idx].as_f64()) {
                (Some(v), Some(p)) if p != 0.0 => Value::from(v / p),
                _ => Value::Missing,
            })
            .collect();
        out.set_column(&config.per_capita_column, per_capita);
    }

    info!(
        input_rows = table.len(),
        output_rows = out.len(),
        duplicates,
        outliers,
        "cleaned table"
    );
    Ok(out)
}

fn drop_outliers(rows: Vec<Vec<Value>>, idx: usize, z_threshold: f64) -> Vec<Vec<Value>> {
    let values: Vec<f64> = rows.iter().filter_map(|r| r[idx].as_f64()).collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        f64::NAN
    };
    let screen = std.is_finite() && std > 0.0;

    rows.into_iter()
        .filter(|row| match row[idx].as_f64() {
            Some(v) if screen => ((v - mean) / std).abs() <= z_threshold,
            Some(_) => true,
            None => false,
        })
        .collect()
}

/// Forward- then backward-fills missing cells within runs of equal group values.
fn fill_within_groups(rows: &mut [Vec<Value>], group_idx: usize) {
    let mut start = 0;
    while start < rows.len() {
        let key = rows[start][group_idx].to_string();
        let end = rows[start..]
            .iter()
            .position(|r| r[group_idx].to_string() != key)
            .map_or(rows.len(), |offset| start + offset);
        fill_group(&mut rows[start..end]);
        start = end;
    }
}

fn fill_group(group: &mut [Vec<Value>]) {
    let Some(width) = group.first().map(Vec::len) else {
        return;
    };
    for col in 0..width {
        let mut last: Option<Value> = None;
        for row in group.iter_mut() {
            if row[col].is_missing() {
                if let Some(v) = &last {
                    row[col] = v.clone();
                }
            } else {
                last = Some(row[col].clone());
            }
        }
        let mut next: Option<Value> = None;
        for row in group.iter_mut().rev() {
            if row[col].is_missing() {
                if let Some(v) = &next {
                    row[col] = v.clone();
                }
            } else {
                next = Some(row[col].clone());
            }
        }
    }
}
