//! X-axis selection for plots and reports.
//!
//! Candidate axes are tried in a fixed priority order; the first one that
//! can be built from the filtered table wins.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

use super::timestamps::TimestampSeries;
use crate::parsers::types::LogTable;
use crate::state::{LAPTIME_COLUMN, LAPTIME_MS_COLUMN};

/// Where an axis comes from. Variant order is selection priority.
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq, Serialize)]
pub enum AxisSource {
    /// Seconds since the first valid timestamp of the filtered table
    #[strum(serialize = "Elapsed time (s)")]
    ElapsedTime,
    /// Millisecond lap counter column
    #[strum(serialize = "Laptime(ms)")]
    LaptimeMs,
    /// Lap counter column
    #[strum(serialize = "Laptime")]
    Laptime,
    /// Row ordinal within the filtered table
    #[strum(serialize = "index")]
    RowIndex,
}

impl AxisSource {
    /// Axis label used on plots and in reports
    pub fn label(&self) -> &'static str {
        match self {
            AxisSource::ElapsedTime => "Elapsed time (s)",
            AxisSource::LaptimeMs => "Laptime(ms)",
            AxisSource::Laptime => "Laptime",
            AxisSource::RowIndex => "index",
        }
    }

    /// Build this axis if its inputs are present
    pub fn build(&self, table: &LogTable, timestamps: Option<&TimestampSeries>) -> Option<Axis> {
        let values = match self {
            AxisSource::ElapsedTime => elapsed_seconds(timestamps?)?,
            AxisSource::LaptimeMs => table.numeric_column(LAPTIME_MS_COLUMN)?,
            AxisSource::Laptime => table.numeric_column(LAPTIME_COLUMN)?,
            AxisSource::RowIndex => (0..table.len()).map(|i| Some(i as f64)).collect(),
        };

        Some(Axis {
            source: *self,
            values,
        })
    }
}

/// Selected x-axis: one value per filtered row (null where unknown)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Axis {
    pub source: AxisSource,
    pub values: Vec<Option<f64>>,
}

impl Axis {
    pub fn label(&self) -> &'static str {
        self.source.label()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Min and max of the non-null values
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Elapsed seconds from the first valid timestamp; `None` without any valid entry
fn elapsed_seconds(timestamps: &TimestampSeries) -> Option<Vec<Option<f64>>> {
    let t0 = timestamps.first_valid()?;
    Some(
        timestamps
            .values()
            .into_iter()
            .map(|at| {
                at.and_then(|at| (at - t0).num_nanoseconds())
                    .map(|ns| ns as f64 / 1e9)
            })
            .collect(),
    )
}

/// Pick the first buildable axis in priority order.
/// Row index always succeeds, so this never fails.
pub fn select_axis(table: &LogTable, timestamps: Option<&TimestampSeries>) -> Axis {
    AxisSource::iter()
        .find_map(|source| source.build(table, timestamps))
        .unwrap_or_else(|| Axis {
            source: AxisSource::RowIndex,
            values: (0..table.len()).map(|i| Some(i as f64)).collect(),
        })
}
