//! Per-channel summary statistics.

use serde::{Deserialize, Serialize};

use crate::parsers::types::LogTable;
use crate::state::CurrentChannel;

/// Summary of one current channel over the filtered log.
/// Every statistic is null when the channel has no numeric value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub column: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

/// Container for descriptive statistics of the non-null values of a series
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1); null with fewer than two values
    pub stdev: Option<f64>,
}

/// Compute descriptive statistics, ignoring null entries
pub fn compute_descriptive_stats(data: &[Option<f64>]) -> DescriptiveStats {
    let values: Vec<f64> = data.iter().flatten().copied().collect();
    if values.is_empty() {
        return DescriptiveStats::default();
    }

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;

    // Variance (two-pass for stability)
    let stdev = if n > 1 {
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        Some(variance.sqrt())
    } else {
        None
    };

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    DescriptiveStats {
        count: n,
        min: Some(min),
        max: Some(max),
        mean: Some(mean),
        stdev,
    }
}

/// Summaries for every required current channel, in declaration order.
/// A channel column missing from the table summarizes as all-null.
pub fn summarize_channels(table: &LogTable) -> Vec<ChannelSummary> {
    CurrentChannel::all()
        .into_iter()
        .map(|channel| {
            let values = table.numeric_column(channel.column()).unwrap_or_default();
            let stats = compute_descriptive_stats(&values);
            ChannelSummary {
                column: channel.column().to_string(),
                min: stats.min,
                max: stats.max,
                mean: stats.mean,
                std: stats.stdev,
            }
        })
        .collect()
}
