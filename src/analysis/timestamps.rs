//! Timestamp derivation from separate date and time columns.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;

use crate::parsers::types::{LogTable, RowId, Value};
use crate::state::{DATE_COLUMN, TIME_COLUMN};

/// Date-time layouts tried in order, each with optional fractional seconds
const DATETIME_FORMATS: &[&str] = &[
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
    "%Y/%m/%d %I:%M:%S%.f %p",
    "%Y-%m-%d %I:%M:%S%.f %p",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts, interpreted as midnight
const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"];

/// Parse a combined `date time` string. Returns `None` when no layout matches.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Timestamp of one row; `at` is `None` when the row's date/time did not parse
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimestampEntry {
    pub row: RowId,
    pub at: Option<NaiveDateTime>,
}

/// Per-row timestamps, positionally aligned with the [`LogTable`] they were
/// derived from and keyed by row id for realignment after filtering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimestampSeries {
    entries: Vec<TimestampEntry>,
}

impl TimestampSeries {
    pub fn entries(&self) -> &[TimestampEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamps in row order
    pub fn values(&self) -> Vec<Option<NaiveDateTime>> {
        self.entries.iter().map(|e| e.at).collect()
    }

    /// First non-null timestamp
    pub fn first_valid(&self) -> Option<NaiveDateTime> {
        self.entries.iter().find_map(|e| e.at)
    }

    pub fn has_valid(&self) -> bool {
        self.first_valid().is_some()
    }

    /// Number of rows whose timestamp could not be parsed
    pub fn invalid_count(&self) -> usize {
        self.entries.iter().filter(|e| e.at.is_none()).count()
    }

    /// Drop entries whose row is no longer in `table`, by row identity
    pub fn realign(&mut self, table: &LogTable) {
        let live: HashSet<RowId> = table.rows.iter().map(|r| r.id).collect();
        self.entries.retain(|e| live.contains(&e.row));
    }

    /// Whether entry `i` belongs to row `i` of `table` for every row
    pub fn is_aligned_with(&self, table: &LogTable) -> bool {
        self.entries.len() == table.len()
            && self
                .entries
                .iter()
                .zip(table.rows.iter())
                .all(|(e, r)| e.row == r.id)
    }
}

/// Derive per-row timestamps from the `Date` and `Time` columns.
///
/// Returns `None` when either column is missing. Rows that fail to parse get
/// a null entry instead of failing the derivation.
pub fn derive_timestamps(table: &LogTable) -> Option<TimestampSeries> {
    let date_idx = table.column_index(DATE_COLUMN)?;
    let time_idx = table.column_index(TIME_COLUMN)?;

    let entries = table
        .rows
        .iter()
        .map(|row| {
            let date = row.values.get(date_idx).and_then(Value::as_text);
            let time = row.values.get(time_idx).and_then(Value::as_text);
            let at = match (date, time) {
                (Some(date), Some(time)) => {
                    parse_datetime(&format!("{} {}", date.trim(), time.trim()))
                }
                _ => None,
            };
            TimestampEntry { row: row.id, at }
        })
        .collect();

    Some(TimestampSeries { entries })
}
