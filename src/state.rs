//! Core schema types and constants.
//!
//! This module contains the fixed column schema of a current log, the
//! required current channels, and the defaults shared by the CLI, the
//! settings layer, and the analysis pipeline.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

// ============================================================================
// Constants
// ============================================================================

/// Canonical date column
pub const DATE_COLUMN: &str = "Date";

/// Canonical time-of-day column
pub const TIME_COLUMN: &str = "Time";

/// Lap counter column (logger sample counter)
pub const LAPTIME_COLUMN: &str = "Laptime";

/// Millisecond lap counter column
pub const LAPTIME_MS_COLUMN: &str = "Laptime(ms)";

/// Cell value that marks the real header row in a file with a metadata preamble
pub const HEADER_MARKER: &str = "Date";

/// Number of raw rows scanned when looking for the header marker
pub const DEFAULT_HEADER_SCAN_DEPTH: usize = 40;

/// Seconds dropped from the start of the run by default
pub const DEFAULT_SKIP_SEC: f64 = 60.0;

/// Rows whose total current does not exceed this (A) are dropped by default
pub const DEFAULT_MIN_TOTAL: f64 = 1.0;

/// Default directory for report artifacts
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Line colors for the three current channels in the exported plot
pub const CHANNEL_COLORS: [[u8; 3]; 3] = [
    [71, 108, 155], // Blue
    [191, 78, 48],  // Rust orange
    [113, 120, 78], // Olive green
];

// ============================================================================
// Core Types
// ============================================================================

/// One of the three required DC current channels.
///
/// Declaration order is the order used for summaries, reports, and plots.
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq, Hash, Serialize)]
pub enum CurrentChannel {
    #[strum(serialize = "Idc_1(A)")]
    #[serde(rename = "Idc_1(A)")]
    Idc1,
    #[strum(serialize = "Idc_2(A)")]
    #[serde(rename = "Idc_2(A)")]
    Idc2,
    #[strum(serialize = "Idc_3(A)")]
    #[serde(rename = "Idc_3(A)")]
    Idc3,
}

impl CurrentChannel {
    /// Canonical column name for this channel
    pub fn column(&self) -> &'static str {
        match self {
            CurrentChannel::Idc1 => "Idc_1(A)",
            CurrentChannel::Idc2 => "Idc_2(A)",
            CurrentChannel::Idc3 => "Idc_3(A)",
        }
    }

    /// Position of the channel in declaration order
    pub fn index(&self) -> usize {
        match self {
            CurrentChannel::Idc1 => 0,
            CurrentChannel::Idc2 => 1,
            CurrentChannel::Idc3 => 2,
        }
    }

    /// All required channels, in declaration order
    pub fn all() -> Vec<CurrentChannel> {
        CurrentChannel::iter().collect()
    }

    /// All required canonical column names, in declaration order
    pub fn columns() -> [&'static str; 3] {
        [
            CurrentChannel::Idc1.column(),
            CurrentChannel::Idc2.column(),
            CurrentChannel::Idc3.column(),
        ]
    }
}
