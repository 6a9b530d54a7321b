use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::normalize::SchemaError;

/// Errors raised while loading a log file into a [`LogTable`]
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input path does not exist
    #[error("Input CSV not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be opened or read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV structure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No rows at all, so there is no header to apply
    #[error("No columns to parse from file: {}", .0.display())]
    Empty(PathBuf),

    /// Header could not be normalized into a consistent schema
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A single cell of a log table.
///
/// Cells load as text and stay text until a column is explicitly coerced
/// with [`LogTable::coerce_numeric`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
    #[default]
    Empty,
}

impl Value {
    /// Build a cell from raw CSV text; blank cells are null
    pub fn from_raw(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Value::Empty
        } else {
            Value::Text(raw.to_string())
        }
    }

    /// Numeric view of the cell; text is parsed on the fly
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_number(s),
            Value::Empty => None,
        }
    }

    /// Text view of the cell
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

/// Parse a numeric cell. `NaN` counts as missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Stable identity of a row, assigned once at load time (0-based data row ordinal)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RowId(pub usize);

/// One data row of a log
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub values: Vec<Value>,
}

/// Loaded log: named columns over rows kept in file order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl LogTable {
    /// Build a table from a header and raw data rows.
    ///
    /// Rows shorter than the header are padded with nulls and longer rows are
    /// truncated. Row ids follow input order.
    pub fn from_records(columns: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                let mut values: Vec<Value> =
                    record.iter().take(width).map(|c| Value::from_raw(c)).collect();
                values.resize(width, Value::Empty);
                Row {
                    id: RowId(i),
                    values,
                }
            })
            .collect();

        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find column index by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Row ids in current row order
    pub fn row_ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|r| r.id).collect()
    }

    /// Cell at a row position and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.values.get(idx))
    }

    /// Numeric view of a column (null where a cell is missing or not a number)
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|r| r.values.get(idx).and_then(Value::as_f64))
                .collect(),
        )
    }

    /// Convert every cell of a column to `Number` or `Empty` in place.
    ///
    /// Returns how many non-empty cells could not be parsed, or `None` when
    /// the column does not exist.
    pub fn coerce_numeric(&mut self, name: &str) -> Option<usize> {
        let idx = self.column_index(name)?;

        let invalid = self
            .rows
            .par_iter_mut()
            .map(|row| {
                let Some(cell) = row.values.get_mut(idx) else {
                    return 0;
                };
                let was_present = !cell.is_empty();
                *cell = match cell.as_f64() {
                    Some(v) => Value::Number(v),
                    None => Value::Empty,
                };
                usize::from(was_present && cell.is_empty())
            })
            .sum::<usize>();

        Some(invalid)
    }

    /// Keep only rows for which `keep` returns true. Order is preserved.
    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.retain(keep);
    }

    /// Keep only rows whose id is in `ids`
    pub fn retain_ids(&mut self, ids: &HashSet<RowId>) {
        self.rows.retain(|r| ids.contains(&r.id));
    }
}

/// Trait for log file parsers
pub trait Parseable {
    fn parse(&self, data: &str) -> Result<LogTable, LoadError>;
}
