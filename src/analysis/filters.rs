//! Row filters applied to a loaded current log.
//!
//! Both stages remove rows only (never reorder or add) and realign a live
//! [`TimestampSeries`] to the surviving rows by row identity before returning.

use chrono::Duration;
use serde::Serialize;
use std::collections::HashSet;
use strum::{AsRefStr, Display};

use super::timestamps::TimestampSeries;
use super::AnalysisError;
use crate::parsers::types::{LogTable, RowId, Value};
use crate::state::CurrentChannel;

/// Identifies a filter stage in reports
#[derive(AsRefStr, Clone, Copy, Debug, Display, PartialEq, Eq, Serialize)]
pub enum FilterStage {
    #[strum(serialize = "time-skip")]
    TimeSkip,
    #[strum(serialize = "min-total")]
    MinTotal,
}

/// What a stage did with the table
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum StageStatus {
    /// The filter ran (it may still have removed nothing)
    Applied,
    /// The filter could not run and passed every row through
    NoOp { reason: String },
}

/// Before/after row counts of one filter stage
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: FilterStage,
    pub before: usize,
    pub after: usize,
    pub status: StageStatus,
}

impl StageReport {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }

    pub fn is_noop(&self) -> bool {
        matches!(self.status, StageStatus::NoOp { .. })
    }
}

/// Convert fractional seconds into a chrono duration (nanosecond resolution)
fn seconds(secs: f64) -> Duration {
    Duration::nanoseconds((secs * 1e9).round() as i64)
}

/// Drop rows that are not yet `skip_sec` past the first valid timestamp.
///
/// Rows with a null timestamp never pass. When no timestamp series is
/// available, or it holds no valid entry, the table passes through and the
/// report is marked [`StageStatus::NoOp`].
pub fn apply_time_skip(
    table: &mut LogTable,
    timestamps: Option<&mut TimestampSeries>,
    skip_sec: f64,
) -> Result<StageReport, AnalysisError> {
    let before = table.len();

    let (series, t0) = match timestamps {
        Some(series) => match series.first_valid() {
            Some(t0) => (series, t0),
            None => {
                return Ok(no_op(
                    FilterStage::TimeSkip,
                    before,
                    "no row has a valid Date/Time",
                ))
            }
        },
        None => {
            return Ok(no_op(
                FilterStage::TimeSkip,
                before,
                "Date/Time columns not available",
            ))
        }
    };

    let threshold = t0 + seconds(skip_sec);
    let keep: HashSet<RowId> = series
        .entries()
        .iter()
        .filter(|e| e.at.is_some_and(|at| at >= threshold))
        .map(|e| e.row)
        .collect();

    table.retain_ids(&keep);
    realign(series, table)?;

    Ok(StageReport {
        stage: FilterStage::TimeSkip,
        before,
        after: table.len(),
        status: StageStatus::Applied,
    })
}

/// Sum of the three current channels for a row.
///
/// Null channels contribute nothing; the sum is null only when every
/// channel is null.
pub fn total_current(channels: &[Option<f64>]) -> Option<f64> {
    channels
        .iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Keep rows whose total current strictly exceeds `min_total`.
/// Rows with a null total are dropped.
pub fn apply_min_total(
    table: &mut LogTable,
    timestamps: Option<&mut TimestampSeries>,
    min_total: f64,
) -> Result<StageReport, AnalysisError> {
    let before = table.len();

    let indices: Vec<Option<usize>> = CurrentChannel::columns()
        .iter()
        .map(|c| table.column_index(c))
        .collect();

    table.retain_rows(|row| {
        let channels: Vec<Option<f64>> = indices
            .iter()
            .map(|idx| idx.and_then(|i| row.values.get(i)).and_then(Value::as_f64))
            .collect();
        total_current(&channels).is_some_and(|total| total > min_total)
    });

    if let Some(series) = timestamps {
        realign(series, table)?;
    }

    Ok(StageReport {
        stage: FilterStage::MinTotal,
        before,
        after: table.len(),
        status: StageStatus::Applied,
    })
}

fn realign(series: &mut TimestampSeries, table: &LogTable) -> Result<(), AnalysisError> {
    series.realign(table);
    if series.is_aligned_with(table) {
        Ok(())
    } else {
        Err(AnalysisError::Misaligned {
            table_rows: table.len(),
            series_rows: series.len(),
        })
    }
}

fn no_op(stage: FilterStage, rows: usize, reason: &str) -> StageReport {
    StageReport {
        stage,
        before: rows,
        after: rows,
        status: StageStatus::NoOp {
            reason: reason.to_string(),
        },
    }
}
