//! In-memory tabular data: named columns over rows of loosely typed cells.

use std::fmt;

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Numeric cell.
    Number(f64),
    /// Free-form text cell.
    Text(String),
    /// Empty or absent cell.
    Missing,
}

impl Value {
    /// Interprets a raw CSV field.
    ///
    /// Empty (after trimming) becomes [`Value::Missing`], anything that parses
    /// as `f64` becomes [`Value::Number`], and the rest is kept as text.
    ///
    /// # Examples
    ///
    /// ```
    /// use energy_scenarios::table::Value;
    ///
    /// assert_eq!(Value::parse("2020"), Value::Number(2020.0));
    /// assert_eq!(Value::parse(" "), Value::Missing);
    /// assert_eq!(Value::parse("solar"), Value::Text("solar".into()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_nan() => Self::Missing,
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    /// Returns the numeric payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        if n.is_nan() { Self::Missing } else { Self::Number(n) }
    }
}

impl From<Option<f64>> for Value {
    fn from(n: Option<f64>) -> Self {
        n.map_or(Self::Missing, Self::from)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole numbers print without a trailing ".0" so years stay "2020".
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
        }
    }
}

/// Ordered rows of named columns.
///
/// Rows are stored aligned to the header, so every row has exactly
/// `columns().len()` cells. Transforms take `&Table` and return a new
/// `Table`; nothing in the crate edits a caller's table in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given header.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding with [`Value::Missing`] or truncating to the header width.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Missing);
        self.rows.push(row);
    }

    /// Builder form of [`Table::push_row`].
    pub fn with_row(mut self, row: Vec<Value>) -> Self {
        self.push_row(row);
        self
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns `true` if a column with this exact name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterates the cells of one column, or `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Cell at `(row, column)`.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Returns `true` when every non-missing cell in the column is numeric and
    /// at least one such cell exists.
    pub fn is_numeric_column(&self, name: &str) -> bool {
        let Some(cells) = self.column(name) else {
            return false;
        };
        let mut seen_number = false;
        for cell in cells {
            match cell {
                Value::Number(_) => seen_number = true,
                Value::Missing => {}
                Value::Text(_) => return false,
            }
        }
        seen_number
    }

    /// Returns a new table with `name` set to `values`.
    ///
    /// An existing column keeps its position and is overwritten; otherwise the
    /// column is appended. `values` is padded with missing cells or truncated
    /// to the row count.
    pub fn with_column(&self, name: &str, values: Vec<Value>) -> Self {
        let mut out = self.clone();
        out.set_column(name, values);
        out
    }

    pub(crate) fn set_column(&mut self, name: &str, mut values: Vec<Value>) {
        values.resize(self.rows.len(), Value::Missing);
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Returns a new table without the named columns.
    pub fn drop_columns(&self, names: &[&str]) -> Self {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !names.contains(&self.columns[i].as_str()))
            .collect();
        Self {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }
}
