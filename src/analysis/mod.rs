//! Analysis pipeline for loaded current logs.
//!
//! Stages run strictly in order, each consuming the previous stage's output:
//!
//! 1. schema check and numeric coercion of the current channels
//! 2. timestamp derivation from `Date` + `Time`
//! 3. time-skip filter, then minimum-total-current filter
//! 4. x-axis selection
//! 5. per-channel summary
//!
//! Nothing here prints or writes files; counts and warnings are returned in
//! [`AnalysisOutcome`] for the reporting layer.

pub mod axis;
pub mod filters;
pub mod statistics;
pub mod timestamps;

use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

use crate::normalize::{require_current_channels, SchemaError};
use crate::parsers::types::LogTable;
use crate::state::{CurrentChannel, DATE_COLUMN, DEFAULT_MIN_TOTAL, DEFAULT_SKIP_SEC, TIME_COLUMN};

pub use axis::{select_axis, Axis, AxisSource};
pub use filters::{apply_min_total, apply_time_skip, FilterStage, StageReport, StageStatus};
pub use statistics::{summarize_channels, ChannelSummary};
pub use timestamps::{derive_timestamps, TimestampSeries};

/// Errors that can occur during analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The log does not carry the required channels
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Invalid filter parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Timestamp series and table fell out of step after filtering
    #[error("Timestamp series misaligned: {series_rows} timestamps for {table_rows} rows")]
    Misaligned { table_rows: usize, series_rows: usize },
}

/// Row filter parameters, fixed for a run
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    /// Seconds after the first valid timestamp to discard
    pub skip_sec: f64,
    /// Rows need a total current strictly above this (A)
    pub min_total: f64,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            skip_sec: DEFAULT_SKIP_SEC,
            min_total: DEFAULT_MIN_TOTAL,
        }
    }
}

impl FilterParameters {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.skip_sec.is_finite() {
            return Err(AnalysisError::InvalidParameter(format!(
                "skip_sec must be a finite number of seconds, got {}",
                self.skip_sec
            )));
        }
        if !self.min_total.is_finite() {
            return Err(AnalysisError::InvalidParameter(format!(
                "min_total must be a finite current, got {}",
                self.min_total
            )));
        }
        Ok(())
    }
}

/// Cells of a column that could not be parsed and were treated as null
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub column: String,
    pub invalid_cells: usize,
}

/// Everything the reporting layer needs from a run
#[derive(Clone, Debug)]
pub struct AnalysisOutcome {
    /// Table after both filters
    pub table: LogTable,
    /// Timestamps aligned with `table`, when Date/Time exist
    pub timestamps: Option<TimestampSeries>,
    /// Row count before any filter
    pub initial_rows: usize,
    pub time_skip: StageReport,
    pub min_total: StageReport,
    pub axis: Axis,
    pub summaries: Vec<ChannelSummary>,
    pub warnings: Vec<ParseWarning>,
    /// Time taken for computation in milliseconds
    pub computation_time_ms: u64,
}

impl AnalysisOutcome {
    /// Rows left after the last stage
    pub fn final_rows(&self) -> usize {
        self.table.len()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Helper function to measure analysis execution time
pub fn timed_analyze<F, T>(f: F) -> (T, u64)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed().as_millis() as u64;
    (result, elapsed)
}

/// Run the whole pipeline on a normalized table.
///
/// Fails before doing any work when a required channel is missing or a
/// parameter is invalid.
pub fn analyze(table: LogTable, params: &FilterParameters) -> Result<AnalysisOutcome, AnalysisError> {
    params.validate()?;
    require_current_channels(&table)?;

    let (outcome, computation_time_ms) = timed_analyze(|| run_stages(table, params));
    let mut outcome = outcome?;
    outcome.computation_time_ms = computation_time_ms;
    Ok(outcome)
}

fn run_stages(mut table: LogTable, params: &FilterParameters) -> Result<AnalysisOutcome, AnalysisError> {
    let mut warnings = Vec::new();

    for column in CurrentChannel::columns() {
        if let Some(invalid) = table.coerce_numeric(column) {
            if invalid > 0 {
                warnings.push(ParseWarning {
                    column: column.to_string(),
                    invalid_cells: invalid,
                });
            }
        }
    }

    let mut timestamps = derive_timestamps(&table);
    if let Some(series) = &timestamps {
        let invalid = series.invalid_count();
        if invalid > 0 {
            warnings.push(ParseWarning {
                column: format!("{} {}", DATE_COLUMN, TIME_COLUMN),
                invalid_cells: invalid,
            });
        }
    }

    let initial_rows = table.len();
    let time_skip = apply_time_skip(&mut table, timestamps.as_mut(), params.skip_sec)?;
    let min_total = apply_min_total(&mut table, timestamps.as_mut(), params.min_total)?;

    let axis = select_axis(&table, timestamps.as_ref());
    let summaries = summarize_channels(&table);

    Ok(AnalysisOutcome {
        table,
        timestamps,
        initial_rows,
        time_skip,
        min_total,
        axis,
        summaries,
        warnings,
        computation_time_ms: 0,
    })
}
