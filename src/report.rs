//! Markdown run report.

use std::fmt::Write as _;
use std::path::Path;

use crate::analysis::{AnalysisOutcome, FilterParameters, StageStatus};
use crate::export::{summary_csv_string, ExportError};

/// Report file name inside the output directory
pub const REPORT_FILE: &str = "report.md";

/// Build the Markdown report for a finished run
pub fn build_report(
    input: &Path,
    params: &FilterParameters,
    outcome: &AnalysisOutcome,
) -> Result<String, ExportError> {
    let summary = summary_csv_string(&outcome.summaries)?;
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "# Current Log Analysis Report\n");
    let _ = writeln!(out, "- Input file: `{}`", input.display());
    let _ = writeln!(out, "- Evaluation starts: {} s after the first timestamp", params.skip_sec);
    let _ = writeln!(out, "- Idle rows excluded: total current > {} A", params.min_total);
    let _ = writeln!(
        out,
        "- Rows: {} → {} (time-skip) → {} (min-total)",
        outcome.initial_rows, outcome.time_skip.after, outcome.min_total.after
    );
    if let StageStatus::NoOp { reason } = &outcome.time_skip.status {
        let _ = writeln!(out, "- Time-skip not applied: {}", reason);
    }
    let _ = writeln!(out, "- X axis: {}", outcome.axis.label());

    if outcome.has_warnings() {
        let _ = writeln!(out, "\n## Parse warnings\n");
        for warning in &outcome.warnings {
            let _ = writeln!(
                out,
                "- `{}`: {} unparseable cell(s) treated as missing",
                warning.column, warning.invalid_cells
            );
        }
    }

    let _ = writeln!(out, "\n## Summary (CSV)\n");
    let _ = writeln!(out, "```");
    out.push_str(&summary);
    let _ = writeln!(out, "```");

    Ok(out)
}

/// Build the report and write it to `path`
pub fn write_report(
    path: &Path,
    input: &Path,
    params: &FilterParameters,
    outcome: &AnalysisOutcome,
) -> Result<(), ExportError> {
    let content = build_report(input, params, outcome)?;
    std::fs::write(path, content).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
