//! idclog - Batch analyzer for three-channel DC current logs
//!
//! Reads one logger CSV, filters it, and writes a summary table, a
//! time-series plot, and a Markdown report into the output directory.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use idclog::analysis::{analyze, AnalysisOutcome, StageStatus};
use idclog::export::{
    write_summary_csv, write_summary_json, write_timeseries_png, PLOT_FILE, SUMMARY_CSV_FILE,
    SUMMARY_JSON_FILE,
};
use idclog::parsers::load_log_csv;
use idclog::report::{write_report, REPORT_FILE};
use idclog::settings::AnalysisSettings;

#[derive(Parser, Debug)]
#[command(name = "idclog", about = "Analyze a DC current log CSV and write a report")]
struct Args {
    /// Input CSV path
    #[arg(long)]
    input: PathBuf,

    /// Seconds from the start of the run to exclude
    #[arg(long, alias = "skip_sec", allow_negative_numbers = true)]
    skip_sec: Option<f64>,

    /// Rows whose total current is at or below this value (A) are excluded
    #[arg(long, alias = "min_total", allow_negative_numbers = true)]
    min_total: Option<f64>,

    /// Directory for summary, plot, and report
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Settings JSON file (defaults to the per-user settings file)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn resolve_settings(args: &Args) -> Result<AnalysisSettings> {
    let mut settings = match &args.config {
        Some(path) => AnalysisSettings::load_from(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => AnalysisSettings::load(),
    };

    if let Some(skip_sec) = args.skip_sec {
        settings.skip_sec = skip_sec;
    }
    if let Some(min_total) = args.min_total {
        settings.min_total = min_total;
    }
    if let Some(output_dir) = &args.output_dir {
        settings.output_dir = output_dir.clone();
    }

    settings.validate()?;
    Ok(settings)
}

fn log_outcome(outcome: &AnalysisOutcome, settings: &AnalysisSettings) {
    for warning in &outcome.warnings {
        tracing::warn!(
            "{}: {} unparseable cell(s) treated as missing",
            warning.column,
            warning.invalid_cells
        );
    }

    match &outcome.time_skip.status {
        StageStatus::Applied => tracing::info!(
            "skip_sec={}s: {} → {} rows",
            settings.skip_sec,
            outcome.time_skip.before,
            outcome.time_skip.after
        ),
        StageStatus::NoOp { reason } => {
            tracing::warn!("skip_sec not applied ({}); all rows kept", reason)
        }
    }

    tracing::info!(
        "min_total={}A: {} → {} rows ({} removed)",
        settings.min_total,
        outcome.min_total.before,
        outcome.min_total.after,
        outcome.min_total.removed()
    );
    tracing::info!(
        "Axis: {}, analysis took {} ms",
        outcome.axis.label(),
        outcome.computation_time_ms
    );
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let settings = resolve_settings(&args)?;

    let table = load_log_csv(&args.input, &settings.aliases(), settings.header_scan_depth)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let params = settings.filter_parameters();
    let outcome = analyze(table, &params).context("Analysis failed")?;
    log_outcome(&outcome, &settings);

    let out_dir = &settings.output_dir;
    let plot_path = out_dir.join(PLOT_FILE);
    if let Some(plot_dir) = plot_path.parent() {
        std::fs::create_dir_all(plot_dir)
            .with_context(|| format!("Failed to create {}", plot_dir.display()))?;
    }

    write_summary_csv(&out_dir.join(SUMMARY_CSV_FILE), &outcome.summaries)?;
    write_summary_json(&out_dir.join(SUMMARY_JSON_FILE), &outcome.summaries)?;
    write_timeseries_png(&plot_path, &outcome)?;
    write_report(&out_dir.join(REPORT_FILE), &args.input, &params, &outcome)?;

    tracing::info!("Done. Results written to {}", out_dir.display());
    Ok(())
}
