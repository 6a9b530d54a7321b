//! Tests for the analysis stages
//!
//! Tests cover:
//! - Time-skip and min-total filters with timestamp realignment
//! - Axis fallback chain
//! - Channel summaries

use idclog::analysis::filters::total_current;
use idclog::analysis::statistics::compute_descriptive_stats;
use idclog::analysis::{
    analyze, apply_min_total, apply_time_skip, derive_timestamps, select_axis, summarize_channels,
    AxisSource, FilterParameters,
};
use idclog::parsers::types::{LogTable, Row, RowId, Value};

use crate::common::float_cmp::{assert_approx_eq, DEFAULT_TOLERANCE};

fn table(columns: &[&str], rows: &[&[&str]]) -> LogTable {
    LogTable::from_records(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

fn current_log(rows: &[(&str, &str, &str, &str)]) -> LogTable {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|(time, a, b, c)| {
            vec![
                "2026/01/14".to_string(),
                time.to_string(),
                a.to_string(),
                b.to_string(),
                c.to_string(),
            ]
        })
        .collect();
    LogTable::from_records(
        ["Date", "Time", "Idc_1(A)", "Idc_2(A)", "Idc_3(A)"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows,
    )
}

// ============================================
// Time-skip Filter Tests
// ============================================

#[test]
fn test_time_skip_keeps_row_after_skip() {
    let mut log = current_log(&[
        ("10:00:00", "1", "1", "1"),
        ("10:00:30", "1", "1", "1"),
        ("10:01:30", "1", "1", "1"),
    ]);
    let mut series = derive_timestamps(&log).unwrap();

    let report = apply_time_skip(&mut log, Some(&mut series), 60.0).unwrap();

    assert_eq!((report.before, report.after), (3, 1));
    assert_eq!(log.row_ids(), vec![RowId(2)]);
    assert_eq!(series.len(), log.len());
}

#[test]
fn test_time_skip_zero_keeps_valid_rows() {
    let mut log = current_log(&[
        ("10:00:00", "1", "1", "1"),
        ("??", "1", "1", "1"),
        ("10:00:02", "1", "1", "1"),
    ]);
    let mut series = derive_timestamps(&log).unwrap();

    apply_time_skip(&mut log, Some(&mut series), 0.0).unwrap();

    // Null timestamps never pass the comparison
    assert_eq!(log.row_ids(), vec![RowId(0), RowId(2)]);
    assert!(series.is_aligned_with(&log));
}

#[test]
fn test_time_skip_noop_is_observable() {
    let mut log = current_log(&[("x", "1", "1", "1"), ("y", "0", "0", "0")]);
    let mut series = derive_timestamps(&log).unwrap();

    let report = apply_time_skip(&mut log, Some(&mut series), 60.0).unwrap();

    assert!(report.is_noop());
    assert_eq!(report.removed(), 0);
    assert_eq!(log.len(), 2);
}

// ============================================
// Min-total Filter Tests
// ============================================

#[test]
fn test_min_total_examples() {
    let mut log = current_log(&[
        ("10:00:00", "0.4", "0.3", "0.2"),
        ("10:00:01", "0.4", "0.3", "0.4"),
    ]);
    let mut series = derive_timestamps(&log).unwrap();

    apply_min_total(&mut log, Some(&mut series), 1.0).unwrap();

    assert_eq!(log.row_ids(), vec![RowId(1)]);
    assert!(series.is_aligned_with(&log));
}

#[test]
fn test_total_current_null_policy() {
    assert_eq!(total_current(&[None, Some(1.5), None]), Some(1.5));
    assert_eq!(total_current(&[None, None, None]), None);
}

#[test]
fn test_filters_keep_alignment_for_mixed_input() {
    let mut log = current_log(&[
        ("10:00:00", "5", "5", "5"),
        ("bad", "5", "5", "5"),
        ("10:00:45", "0", "", ""),
        ("10:01:10", "1", "", "x"),
        ("10:01:20", "", "", ""),
        ("10:01:30", "0.5", "0.5", "0.5"),
    ]);
    let mut series = derive_timestamps(&log).unwrap();

    apply_time_skip(&mut log, Some(&mut series), 60.0).unwrap();
    assert_eq!(series.len(), log.len());
    assert!(series.is_aligned_with(&log));

    apply_min_total(&mut log, Some(&mut series), 1.0).unwrap();
    assert_eq!(series.len(), log.len());
    assert!(series.is_aligned_with(&log));

    assert_eq!(log.row_ids(), vec![RowId(5)]);
}

// ============================================
// Axis Selection Tests
// ============================================

#[test]
fn test_axis_row_ordinal_fallback() {
    let log = table(
        &["Idc_1(A)", "Idc_2(A)", "Idc_3(A)"],
        &[&["1", "1", "1"], &["2", "2", "2"], &["3", "3", "3"], &["4", "4", "4"]],
    );
    let axis = select_axis(&log, derive_timestamps(&log).as_ref());
    assert_eq!(axis.source, AxisSource::RowIndex);
    assert_eq!(axis.label(), "index");
    assert_eq!(
        axis.values,
        vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0)]
    );
}

#[test]
fn test_axis_laptime_fallbacks() {
    let log = table(&["Laptime", "Idc_1(A)"], &[&["5", "1"], &["6", "1"]]);
    let axis = select_axis(&log, None);
    assert_eq!(axis.source, AxisSource::Laptime);
    assert_eq!(axis.label(), "Laptime");

    let log = table(&["Laptime(ms)", "Laptime"], &[&["5000", "5"]]);
    assert_eq!(select_axis(&log, None).label(), "Laptime(ms)");
}

#[test]
fn test_axis_elapsed_time_restarts_after_filtering() {
    let mut log = current_log(&[
        ("10:00:00", "1", "1", "1"),
        ("10:01:00", "1", "1", "1"),
        ("10:01:30", "1", "1", "1"),
    ]);
    let mut series = derive_timestamps(&log).unwrap();
    apply_time_skip(&mut log, Some(&mut series), 60.0).unwrap();

    let axis = select_axis(&log, Some(&series));
    assert_eq!(axis.label(), "Elapsed time (s)");
    assert_eq!(axis.values, vec![Some(0.0), Some(30.0)]);
}

// ============================================
// Summary Tests
// ============================================

#[test]
fn test_summary_all_null_channel() {
    let log = table(
        &["Idc_1(A)", "Idc_2(A)", "Idc_3(A)"],
        &[&["1", "", "a"], &["2", "", "b"]],
    );
    let summaries = summarize_channels(&log);

    assert_eq!(summaries.len(), 3);
    let empty = &summaries[1];
    assert_eq!(empty.column, "Idc_2(A)");
    assert!(empty.min.is_none() && empty.max.is_none());
    assert!(empty.mean.is_none() && empty.std.is_none());
    assert!(summaries[2].mean.is_none());
}

#[test]
fn test_summary_sample_std() {
    let stats = compute_descriptive_stats(&[Some(2.0), Some(4.0), Some(4.0), Some(4.0), Some(5.0), Some(5.0), Some(7.0), Some(9.0)]);
    assert_approx_eq(stats.mean.unwrap(), 5.0, DEFAULT_TOLERANCE);
    // Sample variance 32/7
    assert_approx_eq(stats.stdev.unwrap(), (32.0f64 / 7.0).sqrt(), DEFAULT_TOLERANCE);
    assert_eq!(stats.min, Some(2.0));
    assert_eq!(stats.max, Some(9.0));
}

// ============================================
// Hand-built Table Tests
// ============================================

/// Rows shorter than the header, built directly through the public fields
fn short_rows_table() -> LogTable {
    let text = |s: &str| Value::Text(s.to_string());
    LogTable {
        columns: ["Date", "Time", "Idc_1(A)", "Idc_2(A)", "Idc_3(A)"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: vec![
            Row {
                id: RowId(0),
                values: vec![text("2026/01/14"), text("10:00:00"), text("1"), text("1"), text("1")],
            },
            Row {
                id: RowId(1),
                values: vec![text("2026/01/14"), text("10:00:01")],
            },
            Row {
                id: RowId(2),
                values: vec![],
            },
        ],
    }
}

#[test]
fn test_stages_treat_missing_cells_as_null() {
    let mut log = short_rows_table();

    let mut series = derive_timestamps(&log).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.invalid_count(), 1);

    let report = apply_min_total(&mut log, Some(&mut series), 1.0).unwrap();
    assert_eq!(report.after, 1);
    assert_eq!(log.row_ids(), vec![RowId(0)]);
    assert!(series.is_aligned_with(&log));
}

#[test]
fn test_analyze_table_with_short_rows() {
    let params = FilterParameters {
        skip_sec: 0.0,
        min_total: 1.0,
    };
    let outcome = analyze(short_rows_table(), &params).expect("Should analyze");

    assert_eq!(outcome.initial_rows, 3);
    assert_eq!(outcome.final_rows(), 1);
    assert_approx_eq(outcome.summaries[0].mean.unwrap(), 1.0, DEFAULT_TOLERANCE);
}
